use thiserror::Error;

/// Errors surfaced by the catalog services. The protocol layer flattens
/// these into envelope messages for the frontend.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("invalid locale: {0}")]
    InvalidLocale(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        CoreError::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
