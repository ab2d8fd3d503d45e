//! Persistence capability the upload coordinator writes through.

use std::future::Future;

use anyhow::Result;
use chrono::NaiveDate;
use ledgerlens_core::lexical::dmy_date;
use ledgerlens_core::{Category, RawTransaction, TransactionSource};
use serde::{Deserialize, Serialize};

pub mod file;
pub mod http;
pub mod memory;

pub use file::JsonFileStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

/// Payload handed to a store for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(with = "dmy_date")]
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: TransactionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_timestamp: Option<i64>,
}

impl From<&RawTransaction> for NewTransaction {
    fn from(t: &RawTransaction) -> Self {
        let (payment_method, notes) = match t.source {
            TransactionSource::Sms => (
                Some("Bank Transfer".to_string()),
                Some("Imported from SMS".to_string()),
            ),
            TransactionSource::Statement | TransactionSource::Manual => (None, None),
        };
        Self {
            date: t.date,
            description: t.description.clone(),
            amount: t.amount,
            category: t.category,
            balance: t.balance,
            payment_method,
            notes,
            source: t.source,
            source_timestamp: t.source_timestamp,
        }
    }
}

impl NewTransaction {
    pub fn to_raw(&self) -> RawTransaction {
        RawTransaction {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
            category: self.category,
            balance: self.balance,
            source_timestamp: self.source_timestamp,
            source: self.source,
        }
    }
}

/// A transaction after the store assigned it an identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: String,
    pub owner: String,
    #[serde(flatten)]
    pub transaction: NewTransaction,
}

/// Backing store for imported transactions.
///
/// `create` is not idempotent: calling it twice stores two rows, which is why
/// imports pass through the dedup gate first.
pub trait TransactionStore: Sync {
    fn create(
        &self,
        owner: &str,
        txn: NewTransaction,
    ) -> impl Future<Output = Result<StoredTransaction>> + Send;

    /// Everything already stored for `owner`, used to seed duplicate detection
    fn list_existing(&self, owner: &str) -> impl Future<Output = Result<Vec<RawTransaction>>> + Send;
}
