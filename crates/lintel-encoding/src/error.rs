//! Encoder error types

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EncodeError>;

#[derive(Debug, Error)]
pub enum EncodeError {
    /// A value kind this encoder does not know how to write
    #[error("unsupported value type: {0}")]
    UnsupportedVariant(String),

    /// A number literal that is neither an integer nor a finite float
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// The output sink rejected a write; partial output must be discarded
    #[error("write error: {0}")]
    Write(#[from] io::Error),
}
