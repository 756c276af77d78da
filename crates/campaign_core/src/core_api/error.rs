use std::error::Error;
use std::fmt;
use std::io;

use crate::codec::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Parse,
    Codec,
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Classify an error raised by the format layers.
    pub fn from_io(context: &str, err: io::Error) -> Self {
        let code = if err
            .get_ref()
            .is_some_and(|inner| inner.downcast_ref::<CodecError>().is_some())
        {
            CoreErrorCode::Codec
        } else {
            match err.kind() {
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => CoreErrorCode::Parse,
                io::ErrorKind::InvalidInput => CoreErrorCode::InvalidInput,
                _ => CoreErrorCode::Io,
            }
        };
        Self::new(code, format!("{context}: {err}"))
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}
