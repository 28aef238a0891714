//! Error types for wallfeed.

use thiserror::Error;

use crate::friend::{FriendAction, FriendStatus};

/// A page could not be obtained or persisted.
///
/// Recoverable: the paginator reports it and leaves cursor and cache untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network failure
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("request timed out")]
    Timeout,

    /// Server answered with an error status
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP-like status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },

    /// Response could not be decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Local persistence failed
    #[error("storage error: {0}")]
    Storage(String),
}

/// Reconciliation found data that contradicts the local cache.
///
/// Fatal to the merge that raised it; never resolved silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// An identity field differs between local and remote copies
    #[error("immutable field `{field}` changed for {id}: local={local}, remote={remote}")]
    ImmutableFieldMismatch {
        /// Entity id.
        id: String,
        /// Name of the field.
        field: &'static str,
        /// Local value.
        local: String,
        /// Remote value.
        remote: String,
    },

    /// The merged cache would hold the same id twice
    #[error("duplicate id after merge: {id}")]
    DuplicateId {
        /// The duplicated id.
        id: String,
    },
}

/// A friendship action is not allowed from the actor's current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} from {from}")]
pub struct InvalidTransitionError {
    /// The actor's view of the relationship.
    pub from: FriendStatus,
    /// The rejected action.
    pub action: FriendAction,
}
