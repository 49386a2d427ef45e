//! Infrastructure error types.

/// Key/value storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Reference API failure.
///
/// Never crosses the port boundary: the client logs it and degrades to an
/// empty result.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
