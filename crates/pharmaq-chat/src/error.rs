//! Error types for language-model calls and chat input.

use pharmaq_core::error::PharmaqError;

/// Failures talking to the language model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error("API key not configured")]
    MissingKey,
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Rejections of user chat input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
}

impl From<LlmError> for PharmaqError {
    fn from(err: LlmError) -> Self {
        PharmaqError::Llm(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_display() {
        assert_eq!(LlmError::MissingKey.to_string(), "API key not configured");
        assert_eq!(
            LlmError::Network("connection refused".to_string()).to_string(),
            "network error: connection refused"
        );
        assert_eq!(
            LlmError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string()
            }
            .to_string(),
            "API error (401): Incorrect API key provided"
        );
        assert_eq!(
            LlmError::InvalidResponse("no choices".to_string()).to_string(),
            "invalid response: no choices"
        );
    }

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(2000).to_string(),
            "message exceeds maximum length of 2000 characters"
        );
    }

    #[test]
    fn test_llm_error_into_pharmaq_error() {
        let err: PharmaqError = LlmError::MissingKey.into();
        assert!(matches!(err, PharmaqError::Llm(_)));
        assert!(err.to_string().contains("API key not configured"));
    }
}
