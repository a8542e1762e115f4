pub mod app;
pub mod cli;
pub mod constants;
pub mod models;
pub mod ollama;
pub mod render;
pub mod runtime;
pub mod session;
pub mod utils;

pub use app::{load_config, Config};
pub use models::{ChatMessage, MessageRole, ModelHost};
pub use ollama::OllamaClient;
pub use render::{RenderMode, Renderer, TerminalRenderer};
pub use session::{ChatSession, ConversationHistory};
pub use utils::TermchatError;
