//! Error types for saffron-devices.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] saffron_core::Error),

    #[error("numeric overflow evaluating device {device}")]
    NumericOverflow { device: String },
}

pub type Result<T> = std::result::Result<T, Error>;
