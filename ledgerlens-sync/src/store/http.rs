//! REST backend store: `POST /transactions`, `GET /transactions` with a bearer token.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use ledgerlens_core::{Category, RawTransaction};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{NewTransaction, StoredTransaction, TransactionStore};

#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

/// Row shape returned by the backend listing; only the fingerprint fields matter.
#[derive(Debug, Deserialize)]
struct ListedRow {
    #[serde(default)]
    date: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    balance: Option<f64>,
}

impl ListedRow {
    fn into_raw(self) -> Option<RawTransaction> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%d/%m/%Y").ok()?;
        let category = self
            .category
            .as_deref()
            .and_then(Category::from_label)
            .unwrap_or(Category::Others);
        let mut raw = RawTransaction::new(date, self.description, self.amount, category);
        if let Some(b) = self.balance {
            raw = raw.with_balance(b);
        }
        Some(raw)
    }
}

impl HttpStore {
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let api_base = api_base.trim().trim_end_matches('/');
        if api_base.is_empty() || token.trim().is_empty() {
            bail!("missing API configuration: api_base and token are required");
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_base: api_base.to_string(),
            token: token.trim().to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/transactions", self.api_base)
    }
}

async fn error_message(resp: reqwest::Response) -> String {
    let status = resp.status();
    resp.json::<Value>()
        .await
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| format!("backend returned {status}"))
}

impl TransactionStore for HttpStore {
    async fn create(&self, owner: &str, txn: NewTransaction) -> Result<StoredTransaction> {
        let resp = self
            .client
            .post(self.url())
            .bearer_auth(&self.token)
            .json(&txn)
            .send()
            .await
            .with_context(|| format!("POST {}", self.url()))?;

        if !resp.status().is_success() {
            return Err(anyhow!(error_message(resp).await));
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        let id = ["_id", "id"]
            .iter()
            .find_map(|k| body.get(k).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        Ok(StoredTransaction {
            id,
            owner: owner.to_string(),
            transaction: txn,
        })
    }

    async fn list_existing(&self, owner: &str) -> Result<Vec<RawTransaction>> {
        let resp = self
            .client
            .get(self.url())
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("GET {}", self.url()))?;

        if !resp.status().is_success() {
            return Err(anyhow!(error_message(resp).await));
        }

        let rows: Vec<ListedRow> = resp.json().await.context("decode transaction list")?;
        let total = rows.len();
        let existing: Vec<RawTransaction> = rows.into_iter().filter_map(ListedRow::into_raw).collect();
        debug!(owner, total, usable = existing.len(), "listed existing transactions");
        Ok(existing)
    }
}
