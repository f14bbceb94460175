use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("invalid length")]
    InvalidLength,
    #[error("unknown wallet direction: {0}")]
    InvalidDirection(String),
}
