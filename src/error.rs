//! Error types

use thiserror::Error;

/// Main error type
#[derive(Debug, Clone, Error)]
pub enum AacBoxError {
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("Format error: {message}")]
    Format { message: String },
    #[error("Frame of {needed} bytes exceeds buffer capacity of {capacity} bytes")]
    BufferTooSmall { needed: usize, capacity: usize },
    #[error("Codec error: {message}")]
    Codec { message: String },
    #[error("Unsupported parameter: {message}")]
    Unsupported { message: String },
    #[error("Config error: {message}")]
    Config { message: String },
}

impl AacBoxError {
    pub fn io<S: Into<String>>(msg: S) -> Self {
        Self::Io { message: msg.into() }
    }

    pub fn format<S: Into<String>>(msg: S) -> Self {
        Self::Format { message: msg.into() }
    }

    pub fn codec<S: Into<String>>(msg: S) -> Self {
        Self::Codec { message: msg.into() }
    }

    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Self::Unsupported { message: msg.into() }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config { message: msg.into() }
    }
}

pub type Result<T> = std::result::Result<T, AacBoxError>;

impl From<std::io::Error> for AacBoxError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
