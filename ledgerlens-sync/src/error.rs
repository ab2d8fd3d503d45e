use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The message store can't be reached at all (wrong platform, missing export).
    /// Raised before any parsing; an empty read is not this error.
    #[error("message source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("reading messages failed")]
    Source(#[source] anyhow::Error),

    #[error("transaction store failed")]
    Store(#[source] anyhow::Error),

    /// A persistence call in the current batch failed. Earlier batches stay committed.
    #[error("upload aborted after {inserted} inserted rows ({failed} failed in the current batch)")]
    Upload {
        inserted: usize,
        failed: usize,
        #[source]
        source: anyhow::Error,
    },
}
