//! Error types for saffron-parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: unsupported card `{card}`")]
    Unsupported { line: usize, card: String },

    #[error("netlist has no devices")]
    Empty,
}

impl Error {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
