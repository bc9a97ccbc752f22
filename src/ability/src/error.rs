//! Error types for ability resolution
//!
//! Access checks never fail: a deny is a `false`, not an error. These errors
//! cover identifier parsing and the collaborators that load actors and
//! organizations.

use thiserror::Error;

/// Ability resolution errors
#[derive(Debug, Error)]
pub enum AbilityError {
    /// Action identifier matches no known action
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Resource kind identifier matches no governed resource type
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(String),

    /// No actor exists for the identifier and guests are not accepted
    #[error("Actor not found: {0}")]
    ActorNotFound(String),

    /// Actor or organization loader failed
    #[error("Directory error: {0}")]
    Directory(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed payload handed to a loader
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for ability operations
pub type Result<T> = std::result::Result<T, AbilityError>;
