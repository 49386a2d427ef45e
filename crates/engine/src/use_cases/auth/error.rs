//! Authentication errors.

use questboard_domain::DomainError;

use crate::infrastructure::state_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Store(#[from] StoreError),
}
