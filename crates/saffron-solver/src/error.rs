//! Error types for saffron-solver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid circuit: {0}")]
    Config(#[from] saffron_core::Error),

    #[error("invalid analysis: {0}")]
    InvalidSweep(String),

    #[error("singular MNA matrix at {frequency} Hz")]
    Singular { frequency: f64 },

    #[error("operating point did not converge after {iterations} iterations (residual {residual:.3e} V)")]
    NonConvergent { iterations: usize, residual: f64 },

    #[error("numeric overflow evaluating device {device}")]
    NumericOverflow { device: String },
}

impl From<saffron_devices::Error> for Error {
    fn from(err: saffron_devices::Error) -> Self {
        match err {
            saffron_devices::Error::Model(e) => Error::Config(e),
            saffron_devices::Error::NumericOverflow { device } => Error::NumericOverflow { device },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
