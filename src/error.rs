use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported document: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to extract text from PDF: {0}")]
    Extraction(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Question must not be empty")]
    EmptyQuery,
    #[error("Question answering is unavailable: {0}")]
    QaUnavailable(String),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<lopdf::Error> for AppError {
    fn from(e: lopdf::Error) -> Self {
        AppError::Extraction(e.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::ProviderError(e.to_string())
    }
}
