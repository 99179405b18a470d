use thiserror::Error;

/// Top-level error type for the pharmaq system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for PharmaqError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PharmaqError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PharmaqError {
    fn from(err: toml::de::Error) -> Self {
        PharmaqError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PharmaqError {
    fn from(err: toml::ser::Error) -> Self {
        PharmaqError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PharmaqError {
    fn from(err: serde_json::Error) -> Self {
        PharmaqError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for pharmaq operations.
pub type Result<T> = std::result::Result<T, PharmaqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PharmaqError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(PharmaqError, &str)> = vec![
            (
                PharmaqError::Llm("timeout".to_string()),
                "Language model error: timeout",
            ),
            (
                PharmaqError::Report("no rows".to_string()),
                "Report error: no rows",
            ),
            (
                PharmaqError::Email("relay down".to_string()),
                "Email error: relay down",
            ),
            (
                PharmaqError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
            (
                PharmaqError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PharmaqError = io_err.into();
        assert!(matches!(err, PharmaqError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: PharmaqError = err.unwrap_err().into();
        assert!(matches!(err, PharmaqError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: PharmaqError = err.unwrap_err().into();
        assert!(matches!(err, PharmaqError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
