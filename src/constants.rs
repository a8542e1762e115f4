/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;

// Timeouts
pub const CONNECT_TIMEOUT_SECS: u64 = 5;
pub const HTTP_READ_TIMEOUT_SECS: u64 = 300; // longest silence while a model loads or thinks
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30; // whole list/show exchanges

// Session
pub const QUIT_COMMAND: &str = "/quit";
pub const USER_PROMPT: &str = ">>> ";

pub const PLAIN_SYSTEM_PROMPT: &str = "You are a helpful assistant running in a terminal. \
    Respond in plain text only. Do not use Markdown, headings, bullet symbols or code fences.";

pub const MARKDOWN_SYSTEM_PROMPT: &str = "You are a helpful assistant running in a terminal \
    that renders Markdown. Use Markdown formatting such as headings, emphasis, lists and \
    code blocks whenever it makes the answer easier to read.";

// Fields of the model description that are too noisy to display
pub const HIDDEN_MODEL_FIELDS: &[&str] = &["modelfile", "license", "template"];
