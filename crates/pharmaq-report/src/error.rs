use thiserror::Error;

use pharmaq_core::error::PharmaqError;

/// Errors producing a report artifact.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Spreadsheet(err.to_string())
    }
}

/// Errors sending the report by email.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("required email fields are missing")]
    MissingFields,
    #[error("report is empty")]
    EmptyReport,
    #[error("unsupported SMTP port {0}; use 465 or 587")]
    UnsupportedPort(u16),
    #[error("invalid address {0}")]
    InvalidAddress(String),
    #[error("credential unavailable: {0}")]
    Credential(String),
    #[error("could not build message: {0}")]
    Build(String),
    #[error("{0}")]
    Transport(String),
}

impl From<ReportError> for PharmaqError {
    fn from(err: ReportError) -> Self {
        PharmaqError::Report(err.to_string())
    }
}

impl From<EmailError> for PharmaqError {
    fn from(err: EmailError) -> Self {
        PharmaqError::Email(err.to_string())
    }
}
