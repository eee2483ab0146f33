//! Error types for AssetAsm

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetAsmError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Out of memory")]
    OutOfMemory,
}

impl AssetAsmError {
    pub(crate) fn invalid_argument(field: &str, reason: impl std::fmt::Display) -> Self {
        AssetAsmError::InvalidArgument(format!("{}: {}", field, reason))
    }
}

impl From<hex::FromHexError> for AssetAsmError {
    fn from(err: hex::FromHexError) -> Self {
        AssetAsmError::InvalidArgument(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for AssetAsmError {
    fn from(_: std::collections::TryReserveError) -> Self {
        AssetAsmError::OutOfMemory
    }
}

pub type Result<T> = std::result::Result<T, AssetAsmError>;
