//! Error types for saffron-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("device {device}: {reason}")]
    InvalidDevice { device: String, reason: String },

    #[error("device {device}: node {node} out of range (circuit has {num_nodes} nodes)")]
    NodeOutOfRange {
        device: String,
        node: u32,
        num_nodes: usize,
    },

    #[error("device {device}: unknown model `{model}`")]
    UnknownModel { device: String, model: String },

    #[error("device {device}: model `{model}` is a {found} model, expected {expected}")]
    ModelKindMismatch {
        device: String,
        model: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid circuit: {0}")]
    InvalidCircuit(String),
}

pub type Result<T> = std::result::Result<T, Error>;
