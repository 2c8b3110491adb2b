//! Append-only audit trail of validation outcomes.
//!
//! Each terminal outcome becomes one [`AuditRecord`]. The file store writes
//! JSON Lines, one record per line, and never rewrites earlier lines.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::outcome::{OutcomeState, ValidationOutcome};
use crate::error::JwtAuditError;

/// What gets recorded about one validation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub state: OutcomeState,
    /// Outcome JSON with key material removed.
    pub description: Value,
}

impl AuditEntry {
    pub fn from_outcome(outcome: &ValidationOutcome) -> Self {
        Self {
            state: outcome.state,
            description: outcome.redacted_json(),
        }
    }
}

/// A persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: u64,
    pub state: String,
    pub description: Value,
    pub recorded_at: String,
}

/// Somewhere audit records can be appended.
pub trait AuditStore {
    /// Persist `entry` and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`JwtAuditError::AuditStore`] if the record cannot be written.
    fn append(&self, entry: &AuditEntry) -> Result<AuditRecord, JwtAuditError>;
}

fn record_for(id: u64, entry: &AuditEntry, at: DateTime<Utc>) -> AuditRecord {
    AuditRecord {
        id,
        state: entry.state.to_string(),
        description: entry.description.clone(),
        recorded_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// JSON Lines file store. Ids continue from the last record in the file.
#[derive(Debug)]
pub struct JsonlAuditStore {
    path: PathBuf,
    next_id: Mutex<u64>,
}

impl JsonlAuditStore {
    /// Open (or prepare to create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`JwtAuditError::AuditStore`] if an existing file cannot be
    /// read or its last line is not a record.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JwtAuditError> {
        let path = path.into();
        let next_id = last_id(&path)?.map_or(1, |id| id + 1);
        Ok(Self {
            path,
            next_id: Mutex::new(next_id),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, reason: impl ToString) -> JwtAuditError {
        JwtAuditError::AuditStore {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

fn last_id(path: &Path) -> Result<Option<u64>, JwtAuditError> {
    let store_error = |reason: String| JwtAuditError::AuditStore {
        path: path.display().to_string(),
        reason,
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(store_error(e.to_string())),
    };

    let mut last = None;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| store_error(e.to_string()))?;
        if !line.trim().is_empty() {
            last = Some(line);
        }
    }

    last.map(|line| {
        serde_json::from_str::<AuditRecord>(&line)
            .map(|record| record.id)
            .map_err(|e| store_error(format!("last record is unreadable: {e}")))
    })
    .transpose()
}

impl AuditStore for JsonlAuditStore {
    fn append(&self, entry: &AuditEntry) -> Result<AuditRecord, JwtAuditError> {
        let mut next_id = self.next_id.lock().map_err(|_| self.error("store lock poisoned"))?;
        let record = record_for(*next_id, entry, Utc::now());

        let mut line = serde_json::to_string(&record).map_err(|e| self.error(e))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.error(e))?;
        file.write_all(line.as_bytes()).map_err(|e| self.error(e))?;

        *next_id += 1;
        Ok(record)
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: Mutex<Vec<AuditRecord>>,
}

#[cfg(test)]
impl MemoryAuditStore {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl AuditStore for MemoryAuditStore {
    fn append(&self, entry: &AuditEntry) -> Result<AuditRecord, JwtAuditError> {
        let mut records = self.records.lock().map_err(|_| JwtAuditError::AuditStore {
            path: "<memory>".to_string(),
            reason: "store lock poisoned".to_string(),
        })?;
        let record = record_for(records.len() as u64 + 1, entry, Utc::now());
        records.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::{MSG_EXPIRED, MSG_VALID, OutcomeData};

    fn valid_entry() -> AuditEntry {
        let outcome = ValidationOutcome::new(OutcomeState::Valid, MSG_VALID).with_data(OutcomeData {
            resolved_key: Some("s3cret".to_string()),
            ..OutcomeData::default()
        });
        AuditEntry::from_outcome(&outcome)
    }

    fn expired_entry() -> AuditEntry {
        AuditEntry::from_outcome(
            &ValidationOutcome::new(OutcomeState::Invalid, MSG_EXPIRED).with_reason("Token expirado"),
        )
    }

    #[test]
    fn test_entry_never_contains_key() {
        let entry = valid_entry();
        assert_eq!(entry.state, OutcomeState::Valid);
        assert!(!entry.description.to_string().contains("s3cret"));
    }

    #[test]
    fn test_jsonl_store_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlAuditStore::open(dir.path().join("audit.jsonl")).unwrap();

        let first = store.append(&valid_entry()).unwrap();
        let second = store.append(&expired_entry()).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.state, "invalid");
        assert!(second.recorded_at.ends_with('Z'));

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: AuditRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, second);
        assert_eq!(parsed.description["razon"], "Token expirado");
    }

    #[test]
    fn test_jsonl_store_continues_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        JsonlAuditStore::open(&path).unwrap().append(&valid_entry()).unwrap();
        JsonlAuditStore::open(&path).unwrap().append(&valid_entry()).unwrap();
        let third = JsonlAuditStore::open(&path)
            .unwrap()
            .append(&expired_entry())
            .unwrap();

        assert_eq!(third.id, 3);
    }

    #[test]
    fn test_jsonl_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        std::fs::write(&path, "not a record\n").unwrap();
        assert!(matches!(
            JsonlAuditStore::open(&path),
            Err(JwtAuditError::AuditStore { .. })
        ));
    }

    #[test]
    fn test_jsonl_store_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlAuditStore::open(dir.path().join("missing").join("audit.jsonl")).unwrap();
        assert!(matches!(
            store.append(&valid_entry()),
            Err(JwtAuditError::AuditStore { .. })
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryAuditStore::default();
        store.append(&valid_entry()).unwrap();
        store.append(&expired_entry()).unwrap();
        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, 2);
        assert_eq!(records[0].state, "valid");
    }
}
