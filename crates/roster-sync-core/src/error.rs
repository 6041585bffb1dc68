use thiserror::Error;

use crate::sync::Phase;

/// Failure raised by a [`Repository`](crate::repository::Repository) operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Db(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure raised by a [`Messaging`](crate::messaging::Messaging) operation.
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("message not found")]
    NotFound,

    #[error("platform returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("bot token not set: export {0}")]
    MissingToken(String),

    #[error("messaging platform unavailable: no surfaces are bound")]
    Unavailable,
}

impl MessagingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("not initialized: run 'roster-sync init'")]
    NotInitialized,

    #[error("sync aborted during {phase} phase: {source}")]
    PhaseFailed {
        phase: Phase,
        #[source]
        source: StoreError,
    },

    #[error("roster is empty: refusing to remove every member (set roster.allow_empty to override)")]
    EmptyRoster,

    #[error("invalid roster entry at position {0}: member id is blank")]
    BlankMemberId(usize),

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Messaging(#[from] MessagingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// The phase a run was aborted in, if this error aborted a run.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::PhaseFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
