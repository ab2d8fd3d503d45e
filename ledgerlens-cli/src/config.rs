use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use ledgerlens_core::RawTransaction;
use ledgerlens_ingest::MAX_MESSAGE_LIMIT;
use ledgerlens_sync::{
    DEFAULT_BATCH_SIZE, HttpStore, JsonFileStore, NewTransaction, StoredTransaction,
    TransactionStore,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_ledgerlens_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub import: ImportSection,
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    /// Scope used for duplicate detection and stored rows
    pub owner: String,
    /// Concurrent creates per upload batch
    pub batch_size: usize,
    /// IANA zone used to turn SMS timestamps into calendar dates
    pub timezone: String,
    /// Max messages read per SMS import pass
    pub message_limit: usize,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            owner: "local".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            timezone: "Asia/Kolkata".to_string(),
            message_limit: MAX_MESSAGE_LIMIT,
        }
    }
}

impl ImportSection {
    pub fn tz(&self) -> Result<Tz> {
        ledgerlens_core::time::parse_timezone(&self.timezone)
            .ok_or_else(|| anyhow!("invalid timezone: {}", self.timezone))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreSection {
    /// Local JSON file; defaults to ~/.ledgerlens/transactions.json
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// Remote backend exposing /transactions
    Http { api_base: String, token: String },
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection::File { path: None }
    }
}

/// Store picked by config
pub enum Store {
    File(JsonFileStore),
    Http(HttpStore),
}

impl StoreSection {
    pub fn open(&self) -> Result<Store> {
        match self {
            StoreSection::File { path } => {
                let path = match path {
                    Some(p) => p.clone(),
                    None => ensure_ledgerlens_home()?.join("transactions.json"),
                };
                Ok(Store::File(JsonFileStore::new(path)))
            }
            StoreSection::Http { api_base, token } => Ok(Store::Http(HttpStore::new(api_base, token)?)),
        }
    }
}

impl TransactionStore for Store {
    async fn create(&self, owner: &str, txn: NewTransaction) -> Result<StoredTransaction> {
        match self {
            Store::File(s) => s.create(owner, txn).await,
            Store::Http(s) => s.create(owner, txn).await,
        }
    }

    async fn list_existing(&self, owner: &str) -> Result<Vec<RawTransaction>> {
        match self {
            Store::File(s) => s.list_existing(owner).await,
            Store::Http(s) => s.list_existing(owner).await,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_ledgerlens_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.import.batch_size, 25);
        assert_eq!(cfg.import.owner, "local");
        assert!(matches!(cfg.store, StoreSection::File { path: None }));
        assert!(cfg.import.tz().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(
            &p,
            r#"
[import]
batch_size = 10
timezone = "Europe/London"

[store]
kind = "http"
api_base = "https://api.example.com"
token = "secret"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.import.batch_size, 10);
        assert_eq!(cfg.import.message_limit, 1000);
        assert_eq!(cfg.import.tz().unwrap(), chrono_tz::Europe::London);
        assert!(matches!(cfg.store, StoreSection::Http { .. }));
    }

    #[test]
    fn test_defaults_serialize() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.import.timezone, "Asia/Kolkata");
    }
}
