//! In-process store that records how many creates overlap, so batch
//! concurrency can be asserted against it.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow, bail};
use ledgerlens_core::RawTransaction;

use super::{NewTransaction, StoredTransaction, TransactionStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredTransaction>>,
    /// Reject creates whose description contains this text
    fail_on: Option<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    waves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(description: impl Into<String>) -> Self {
        Self {
            fail_on: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<StoredTransaction> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Highest number of creates that were pending at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of times the store went from idle to busy
    pub fn waves(&self) -> usize {
        self.waves.load(Ordering::SeqCst)
    }
}

impl TransactionStore for MemoryStore {
    async fn create(&self, owner: &str, txn: NewTransaction) -> Result<StoredTransaction> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        if now == 1 {
            self.waves.fetch_add(1, Ordering::SeqCst);
        }
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Let sibling creates in the same batch start before this one finishes
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(needle) = &self.fail_on {
            if txn.description.contains(needle.as_str()) {
                bail!("store rejected '{}'", txn.description);
            }
        }

        let mut rows = self.rows.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        let stored = StoredTransaction {
            id: format!("mem-{:06}", rows.len() + 1),
            owner: owner.to_string(),
            transaction: txn,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn list_existing(&self, owner: &str) -> Result<Vec<RawTransaction>> {
        let rows = self.rows.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(rows
            .iter()
            .filter(|r| r.owner == owner)
            .map(|r| r.transaction.to_raw())
            .collect())
    }
}
