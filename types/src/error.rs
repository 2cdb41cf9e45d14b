//! Top-level error type shared across crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid block hash: {0}")]
    InvalidBlockHash(String),

    #[error("invalid chain id: {0}")]
    InvalidChainId(String),
}
