/// Interactive chat session module - Gateway

mod chat;
mod history;
mod input;
mod reply;
mod selector;

pub use chat::{greeting_prompt, ChatSession, SessionSettings, SessionState};
pub use history::ConversationHistory;
pub use input::{InputSource, LineEditor};
pub use reply::{drain_reply, present_reply};
pub use selector::{resolve_model, select_model};

#[cfg(test)]
pub(crate) use reply::testing;
