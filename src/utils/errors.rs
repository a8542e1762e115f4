use thiserror::Error;

/// Main error type for termchat
#[derive(Error, Debug)]
pub enum TermchatError {
    #[error("model host unreachable at {host}")]
    HostUnreachable { host: String },

    #[error("model '{model}' not found on the model host")]
    ModelNotFound { model: String },

    #[error("upstream error: {0}")]
    UpstreamError(String),

    #[error("no models are installed on the model host")]
    NoModelsInstalled,

    #[error("input error: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TermchatError {
    /// A short suggestion shown under the error message, if one applies
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::HostUnreachable { .. } => Some(
                "Please check that ollama is running (`ollama serve`), or install ollama first."
                    .to_string(),
            ),
            Self::ModelNotFound { model } => Some(format!(
                "Install the model first with `ollama pull {}`, or run `termchat list-models`.",
                model
            )),
            Self::NoModelsInstalled => {
                Some("Pull a model with `ollama pull <model>` and try again.".to_string())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TermchatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        let err = TermchatError::HostUnreachable {
            host: "http://localhost:11434".to_string(),
        };
        assert!(err.hint().unwrap().contains("ollama serve"));

        let err = TermchatError::ModelNotFound {
            model: "mistral".to_string(),
        };
        assert_eq!(err.to_string(), "model 'mistral' not found on the model host");
        assert!(err.hint().unwrap().contains("ollama pull mistral"));

        assert!(TermchatError::UpstreamError("boom".to_string()).hint().is_none());
    }
}
