use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Failure of a key-value store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store {op} failed: {message}")]
    Backend { op: &'static str, message: String },

    #[error("invalid value at {key}: {message}")]
    Decode { key: String, message: String },

    #[error("failed to encode value: {0}")]
    Encode(String),

    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn backend(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            op,
            message: err.to_string(),
        }
    }

    pub fn decode(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            key: key.into(),
            message: err.to_string(),
        }
    }
}
