//! Shared primitives for all Rust crates in Assent.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across Assent crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist for the calling subject.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated or presented an invalid credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller exceeded a request budget.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The datastore or an external capability is temporarily unreachable.
    /// Safe to retry; all core operations are idempotent or conditionally
    /// applied.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn errors_render_their_category() {
        let error = AppError::Unavailable("profile endpoint timed out".to_owned());
        assert_eq!(
            error.to_string(),
            "upstream unavailable: profile endpoint timed out"
        );
    }
}
