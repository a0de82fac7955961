use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while generating or querying a tablebase.
#[derive(Debug, Error)]
pub enum TablebaseError {
    /// Inputs rejected before any enumeration starts.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The probed position is in neither the win nor the loss table.
    #[error("position is not determined by the tablebase")]
    Undetermined,

    /// No successor continues the forced line; the move generators disagree with the tables.
    #[error("forced line broken at depth {depth}: no successor one ply closer to mate")]
    BrokenLine { depth: u16 },

    /// A distributed worker lost its peers mid-round.
    #[error("worker {worker}: transport failure: {reason}")]
    Transport { worker: usize, reason: String },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("io error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

impl TablebaseError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        TablebaseError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = TablebaseError> = std::result::Result<T, E>;
