// Error types for the partitioned writer crate

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem and encoding failures are fatal: the run aborts without
/// automatic retry, which is safe to re-run thanks to the idempotent
/// partition skip.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{op} failed for {path}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode partition {event_date} as parquet")]
    Encode {
        event_date: String,
        #[source]
        source: anyhow::Error,
    },
}

impl WriteError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, WriteError>;
