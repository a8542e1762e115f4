use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::HIDDEN_MODEL_FIELDS;

/// Who authored a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single conversation message. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: MessageRole,
    content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Description of an installed model as reported by the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDetails {
    fields: Map<String, Value>,
}

impl ModelDetails {
    /// Build from the raw host response, dropping fields nobody wants to read
    pub fn from_raw(mut fields: Map<String, Value>) -> Self {
        for hidden in HIDDEN_MODEL_FIELDS {
            fields.remove(*hidden);
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_message_wire_shape() {
        let msg = ChatMessage::user("hello");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "user", "content": "hello"})
        );
    }

    #[test]
    fn test_model_details_hides_noisy_fields() {
        let raw = json!({
            "modelfile": "FROM llama3",
            "license": "META LLAMA 3 COMMUNITY LICENSE",
            "template": "{{ .Prompt }}",
            "parameters": "stop \"<|eot_id|>\"",
            "details": {"family": "llama", "parameter_size": "8.0B"}
        });
        let details = ModelDetails::from_raw(raw.as_object().unwrap().clone());

        let keys: Vec<&str> = details.entries().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"parameters"));
        assert!(keys.contains(&"details"));
        assert!(details.get("modelfile").is_none());
        assert!(details.get("license").is_none());
        assert!(details.get("template").is_none());
    }
}
