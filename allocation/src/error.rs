use std::time::Duration;

use thiserror::Error;

use reservation::manager::CommitError;
use venue::model::TableId;

/// Error taxonomy at the engine boundary.
///
/// "Nothing fits" is not an error: `suggest` returns `Ok(vec![])`. Only the
/// commit step can fail non-deterministically, and those failures keep their
/// identity: a conflict is final for these tables, a timeout is retryable,
/// a store failure is retryable with backoff. A failed commit guarantees no
/// reservation row was created.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A commit lost the race for the listed tables.
    #[error("reservation conflict on tables {0:?}")]
    Conflict(Vec<TableId>),

    /// Commit could not serialize within the configured bound.
    #[error("commit timed out acquiring table locks after {0:?}")]
    CommitTimeout(Duration),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}

impl From<CommitError> for EngineError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::Conflict(tables) => EngineError::Conflict(tables),
            CommitError::LockTimeout(bound) => EngineError::CommitTimeout(bound),
            CommitError::Store(source) => EngineError::StoreUnavailable(source),
        }
    }
}
