use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub fn ledgerlens_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LEDGERLENS_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ledgerlens"))
}

pub fn ensure_ledgerlens_home() -> Result<PathBuf> {
    let dir = ledgerlens_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Persisted between runs so SMS imports only read what's new
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportState {
    /// Newest message timestamp seen by the last successful SMS import (epoch millis)
    #[serde(default)]
    pub sms_cursor: i64,
}

impl ImportState {
    /// Move the cursor forward; never backwards.
    pub fn advance(&mut self, latest: Option<i64>) -> bool {
        match latest {
            Some(ts) if ts > self.sms_cursor => {
                self.sms_cursor = ts;
                true
            }
            _ => false,
        }
    }
}

pub fn state_path() -> Result<PathBuf> {
    Ok(ensure_ledgerlens_home()?.join("state.json"))
}

pub fn read_state(path: &Path) -> Result<ImportState> {
    if !path.exists() {
        return Ok(ImportState::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_state(path: &Path, state: &ImportState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cursor_only_moves_forward() {
        let mut state = ImportState::default();
        assert!(state.advance(Some(100)));
        assert!(!state.advance(Some(50)));
        assert!(!state.advance(None));
        assert_eq!(state.sms_cursor, 100);
    }

    #[test]
    fn test_state_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        assert_eq!(read_state(&path).unwrap(), ImportState::default());

        let state = ImportState { sms_cursor: 1718433000000 };
        write_state(&path, &state).unwrap();
        assert_eq!(read_state(&path).unwrap(), state);
    }
}
