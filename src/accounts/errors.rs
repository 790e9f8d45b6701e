use thiserror::Error;

/// Failures surfaced by the account store and its manager.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Input rejected before anything was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The email is already held by another account.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("user not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

pub type AccountResult<T> = Result<T, AccountError>;
