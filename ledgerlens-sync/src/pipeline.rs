//! End-to-end imports: read → parse → dedup against the store → upload.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ledgerlens_ingest::{
    MessageBatch, MessageParser, MessageQuery, RowAcceptance, SmsMessage, TokenStreamParser,
    select_messages,
};
use tracing::{debug, info};

use crate::error::SyncError;
use crate::store::TransactionStore;
use crate::upload::{UploadCoordinator, UploadReport};

/// Where alert messages come from (device inbox, an exported file, ...)
pub trait MessageSource: Sync {
    /// False when the capability doesn't exist here at all
    fn is_available(&self) -> bool;

    fn read_messages(&self, query: &MessageQuery) -> impl Future<Output = Result<Vec<SmsMessage>>> + Send;
}

/// Messages exported to a JSON file (bare array or `{ "messages": [...] }`)
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MessageSource for JsonFileSource {
    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    async fn read_messages(&self, query: &MessageQuery) -> Result<Vec<SmsMessage>> {
        let s = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read {}", self.path.display()))?;
        let batch: MessageBatch =
            serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))?;
        Ok(select_messages(batch.into_messages(), query))
    }
}

/// Import one window of alert messages.
///
/// Fails with `SourceUnavailable` before reading anything when the source is
/// missing; an empty window is a normal, empty report.
pub async fn import_messages<M, S>(
    source: &M,
    parser: &MessageParser,
    query: &MessageQuery,
    coordinator: &UploadCoordinator<'_, S>,
) -> Result<UploadReport, SyncError>
where
    M: MessageSource,
    S: TransactionStore,
{
    if !source.is_available() {
        return Err(SyncError::SourceUnavailable(
            "no message store on this platform".to_string(),
        ));
    }

    let messages = source.read_messages(query).await.map_err(SyncError::Source)?;
    // Sources are not trusted to honour the window themselves
    let messages = select_messages(messages, query);
    let candidates = parser.parse_messages(&messages);
    debug!(messages = messages.len(), candidates = candidates.len(), "sms candidates ready");

    let existing = coordinator.existing().await?;
    let report = coordinator.upload(&candidates, &existing).await?;
    info!(
        attempted = report.attempted,
        inserted = report.inserted,
        skipped = report.skipped,
        "sms import finished"
    );
    Ok(report)
}

/// Import rows reconstructed from a statement's token stream.
pub async fn import_statement<T, A, S>(
    tokens: &[T],
    parser: &TokenStreamParser<A>,
    coordinator: &UploadCoordinator<'_, S>,
) -> Result<UploadReport, SyncError>
where
    T: AsRef<str>,
    A: RowAcceptance,
    S: TransactionStore,
{
    let candidates = parser.parse(tokens);
    let existing = coordinator.existing().await?;
    let report = coordinator.upload(&candidates, &existing).await?;
    info!(
        attempted = report.attempted,
        inserted = report.inserted,
        skipped = report.skipped,
        "statement import finished"
    );
    Ok(report)
}
