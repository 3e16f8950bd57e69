//! Error types for gamification operations.

use marcha_core::StoreError;
use thiserror::Error;

/// Result type alias for gamification operations.
pub type Result<T> = std::result::Result<T, GamificationError>;

/// Failures of the gamification services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GamificationError {
    /// No user with this email exists.
    #[error("No user found for email {email}")]
    UserNotFound {
        /// The email that was looked up
        email: String,
    },

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
