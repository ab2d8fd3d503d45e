//! Upload coordinator: dedup, then persist in fixed-size concurrent batches.

use futures_util::future::join_all;
use ledgerlens_core::RawTransaction;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dedup::{DedupOutcome, dedupe};
use crate::error::SyncError;
use crate::store::{NewTransaction, TransactionStore};

pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Aggregate counts for one upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    /// Candidates considered, duplicates included
    pub attempted: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// Newest message timestamp among all candidates, for advancing the import cursor
    pub latest_source_timestamp: Option<i64>,
}

pub struct UploadCoordinator<'a, S> {
    store: &'a S,
    owner: String,
    batch_size: usize,
}

impl<'a, S: TransactionStore> UploadCoordinator<'a, S> {
    pub fn new(store: &'a S, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Max concurrent creates per batch; clamped to at least 1.
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            ..self
        }
    }

    /// Snapshot of stored rows used to seed duplicate detection.
    ///
    /// Best effort: rows another uploader inserts after this call are not seen.
    pub async fn existing(&self) -> Result<Vec<RawTransaction>, SyncError> {
        self.store
            .list_existing(&self.owner)
            .await
            .map_err(SyncError::Store)
    }

    pub async fn upload(
        &self,
        candidates: &[RawTransaction],
        existing: &[RawTransaction],
    ) -> Result<UploadReport, SyncError> {
        let latest_source_timestamp = latest_source_timestamp(candidates);
        let DedupOutcome { to_upload, skipped } = dedupe(candidates, existing);

        let inserted = self.persist(&to_upload).await?;

        Ok(UploadReport {
            attempted: candidates.len(),
            inserted,
            skipped,
            latest_source_timestamp,
        })
    }

    /// Persist already-deduplicated rows. Each batch runs concurrently and is
    /// awaited in full before the next one starts; the first failing batch
    /// aborts the upload.
    pub async fn persist(&self, to_upload: &[RawTransaction]) -> Result<usize, SyncError> {
        let mut inserted = 0;

        for (wave, chunk) in to_upload.chunks(self.batch_size).enumerate() {
            let results = join_all(
                chunk
                    .iter()
                    .map(|t| self.store.create(&self.owner, NewTransaction::from(t))),
            )
            .await;

            let mut errors = results.into_iter().filter_map(Result::err);
            if let Some(first) = errors.next() {
                let failed = 1 + errors.count();
                warn!(wave, inserted, failed, error = %first, "upload batch failed");
                return Err(SyncError::Upload {
                    inserted,
                    failed,
                    source: first,
                });
            }

            inserted += chunk.len();
            debug!(wave, batch = chunk.len(), inserted, "upload batch committed");
        }

        Ok(inserted)
    }
}

pub fn latest_source_timestamp(candidates: &[RawTransaction]) -> Option<i64> {
    candidates
        .iter()
        .filter_map(|t| t.source_timestamp)
        .filter(|ts| *ts > 0)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use ledgerlens_core::Category;

    fn tx(i: u32) -> RawTransaction {
        RawTransaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            format!("Row {i}"),
            -(i as f64 + 1.0),
            Category::Others,
        )
        .with_source_timestamp(1_000 + i as i64)
    }

    #[tokio::test]
    async fn test_batches_are_sequential_waves() {
        let store = MemoryStore::new();
        let candidates: Vec<_> = (0..60).map(tx).collect();

        let report = UploadCoordinator::new(&store, "alice")
            .with_batch_size(25)
            .upload(&candidates, &[])
            .await
            .unwrap();

        assert_eq!(report.attempted, 60);
        assert_eq!(report.inserted, 60);
        assert_eq!(report.skipped, 0);
        assert_eq!(store.rows().len(), 60);
        assert_eq!(store.waves(), 3);
        assert_eq!(store.max_in_flight(), 25);
    }

    #[tokio::test]
    async fn test_latest_timestamp_counts_skipped_duplicates() {
        let store = MemoryStore::new();
        let newest = tx(99);
        let report = UploadCoordinator::new(&store, "alice")
            .upload(&[tx(1), newest.clone()], &[newest])
            .await
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.latest_source_timestamp, Some(1_099));
    }

    #[tokio::test]
    async fn test_failure_reports_rows_from_earlier_batches() {
        let store = MemoryStore::failing_on("Row 7");
        let candidates: Vec<_> = (0..10).map(tx).collect();

        let err = UploadCoordinator::new(&store, "alice")
            .with_batch_size(5)
            .upload(&candidates, &[])
            .await
            .unwrap_err();

        match err {
            SyncError::Upload { inserted, failed, .. } => {
                assert_eq!(inserted, 5);
                assert_eq!(failed, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The rest of the failing batch was already dispatched and is not rolled back
        assert_eq!(store.rows().len(), 9);
    }

    #[tokio::test]
    async fn test_nothing_to_upload() {
        let store = MemoryStore::new();
        let report = UploadCoordinator::new(&store, "alice")
            .with_batch_size(0)
            .upload(&[], &[])
            .await
            .unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(report.latest_source_timestamp, None);
        assert_eq!(store.waves(), 0);
    }
}
