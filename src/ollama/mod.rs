/// Ollama integration module - Gateway
mod client;
mod guide;
mod wire;

pub use client::{normalize_host, OllamaClient};
pub use guide::{first_model_hint, report_error};
