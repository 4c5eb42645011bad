//! Error types for the TAMI library

use thiserror::Error;

/// Main error type for TAMI operations
#[derive(Error, Debug)]
pub enum TamiError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid transaction for item {item_id}: {reason}")]
    InvalidTransaction { item_id: String, reason: String },
}

/// Result type alias for TAMI operations
pub type Result<T> = std::result::Result<T, TamiError>;
