//! Authentication: password hashing, JWT signing, and the session token
//! lifecycle.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod tokens;

use thiserror::Error;

use crate::store::StoreError;

pub use tokens::{TokenService, TokenSettings};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Tokens were signed but could not be persisted.
    #[error("Failed to issue tokens: {0}")]
    TokenIssuance(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
