use thiserror::Error;

/// Errors returned by a response provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("provider unavailable")]
    Unavailable,
}

impl ProviderError {
    pub fn provider(message: impl Into<String>) -> Self {
        ProviderError::Provider {
            message: message.into(),
        }
    }
}

/// Recoverable failures inside a chat session.
///
/// These never escape the session as `Err`; they are reported through
/// operation outcomes, a system message and a notification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("failed to get response: {0}")]
    Response(ProviderError),

    #[error("failed to load older messages: {0}")]
    HistoryFetch(ProviderError),
}

/// Errors related to model selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("model '{0}' not found")]
    NotFound(String),
}

/// Errors related to the chat history sidebar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("chat not found")]
    NotFound,
}

/// Reasons a file was refused by the upload stager.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("{name} exceeds the {limit_mb}MB limit")]
    TooLarge { name: String, limit_mb: u64 },

    #[error("{name} is not an accepted file type ({accepted})")]
    UnsupportedType { name: String, accepted: String },

    #[error("staged file not found")]
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::Response(ProviderError::provider("timeout"));
        assert_eq!(
            err.to_string(),
            "failed to get response: provider error: timeout"
        );
    }

    #[test]
    fn test_upload_error_display() {
        let err = UploadError::TooLarge {
            name: "big.pdf".to_string(),
            limit_mb: 10,
        };
        assert_eq!(err.to_string(), "big.pdf exceeds the 10MB limit");
    }

    #[test]
    fn test_model_error_display() {
        let err = ModelError::NotFound("gpt-5".to_string());
        assert_eq!(err.to_string(), "model 'gpt-5' not found");
    }
}
