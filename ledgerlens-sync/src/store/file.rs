//! Local JSON-file store: one array of stored transactions per file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ledgerlens_core::RawTransaction;
use tokio::sync::Mutex;

use super::{NewTransaction, StoredTransaction, TransactionStore};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored rows, regardless of owner. A missing file is an empty store.
    pub async fn load(&self) -> Result<Vec<StoredTransaction>> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("check {}", self.path.display()))?;
        if !exists {
            return Ok(Vec::new());
        }
        let s = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read {}", self.path.display()))?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    async fn save(&self, rows: &[StoredTransaction]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(rows)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("write {}", self.path.display()))
    }
}

impl TransactionStore for JsonFileStore {
    async fn create(&self, owner: &str, txn: NewTransaction) -> Result<StoredTransaction> {
        let _guard = self.lock.lock().await;
        let mut rows = self.load().await?;
        let stored = StoredTransaction {
            id: format!("tx-{:06}", rows.len() + 1),
            owner: owner.to_string(),
            transaction: txn,
        };
        rows.push(stored.clone());
        self.save(&rows).await?;
        Ok(stored)
    }

    async fn list_existing(&self, owner: &str) -> Result<Vec<RawTransaction>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|r| r.owner == owner)
            .map(|r| r.transaction.to_raw())
            .collect())
    }
}
