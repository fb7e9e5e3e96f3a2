//! Domain errors for entity dispatch and the backing cookbook service.

use thiserror::Error;

/// Result type for cookbook operations.
pub type CookbookResult<T> = Result<T, CookbookError>;

/// Errors surfaced by the dispatcher and the backing client.
///
/// Resolution and conversion failures are produced locally. Everything else
/// comes from the backing client and is passed through unchanged so the
/// reconnection layer can apply its own policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CookbookError {
    #[error("unknown entity kind: {0}")]
    UnknownEntityKind(String),

    #[error("{}", invalid_entity_message(.field, .reason))]
    InvalidEntity {
        /// Path of the offending field (e.g. `ingredients[1].quantity`), if known
        field: Option<String>,
        reason: String,
    },

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("session expired: {0}")]
    SessionExpired(String),

    #[error("invalid access token: {0}")]
    InvalidToken(String),

    #[error("remote fetch failed with status {status}: {body}")]
    RemoteFetchFailed { status: u16, body: String },

    #[error("cookbook API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),
}

fn invalid_entity_message(field: &Option<String>, reason: &str) -> String {
    match field {
        Some(field) => format!("invalid entity: field '{}': {}", field, reason),
        None => format!("invalid entity: {}", reason),
    }
}

impl CookbookError {
    /// Builds an `InvalidEntity` error pointing at a specific field.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CookbookError::InvalidEntity {
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    /// Builds an `InvalidEntity` error that is not tied to one field.
    pub fn invalid(reason: impl Into<String>) -> Self {
        CookbookError::InvalidEntity {
            field: None,
            reason: reason.into(),
        }
    }

    /// Returns true if re-authenticating and retrying may succeed.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, CookbookError::SessionExpired(_))
    }

    /// Field path carried by an `InvalidEntity` error.
    pub fn field(&self) -> Option<&str> {
        match self {
            CookbookError::InvalidEntity { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}
