//! Error types for access-control primitives

use thiserror::Error;

/// Access-control errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AclError {
    /// Principal string could not be parsed
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// Permission value was empty
    #[error("Permission cannot be empty")]
    EmptyPermission,
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AclError>;
