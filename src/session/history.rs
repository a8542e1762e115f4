use crate::models::{ChatMessage, MessageRole};

/// Ordered conversation history, owned by one session
///
/// Append-only apart from `rollback_user`, which discards a user message
/// whose reply never arrived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    /// Start a history, optionally seeded with a system message
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            messages: system_prompt.map(ChatMessage::system).into_iter().collect(),
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Drop the trailing user message, if the history ends with one
    pub fn rollback_user(&mut self) -> Option<ChatMessage> {
        match self.messages.last() {
            Some(last) if last.role() == MessageRole::User => self.messages.pop(),
            _ => None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
