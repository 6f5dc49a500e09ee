//! Snapshot persistence: save/load the registry to disk so alerts survive
//! a restart. The preferred on-disk format is TOML, an array-of-tables of
//! `[[alert]]` records with `description`/`metadata` Z85-encoded so
//! arbitrary bytes (newlines, control characters) survive a round trip
//! through a line-oriented text format. A legacy length-prefixed binary
//! format is still read (never written) for snapshots produced before
//! the TOML format existed.

use alertsd_model::zbytes;
use alertsd_model::{codec, Alert, AlertState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("toml serialization failed: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("toml parse failed: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("snapshot record has unknown state {0:?}")]
    UnknownState(String),
    #[error("z85 payload corrupt: {0}")]
    Z85(#[from] zbytes::ZError),
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default, rename = "alert")]
    alerts: Vec<SnapshotAlert>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotAlert {
    rule: String,
    element: String,
    state: String,
    severity: String,
    description: String,
    metadata: String,
    time: u64,
    #[serde(default)]
    actions: Vec<String>,
    ttl: u64,
    ctime: u64,
    last_sent: u64,
}

impl SnapshotAlert {
    fn from_alert(alert: &Alert) -> Self {
        Self {
            rule: alert.rule.clone(),
            element: alert.element.clone(),
            state: alert.state.to_string(),
            severity: alert.severity.clone(),
            description: zbytes::encode(&alert.description),
            metadata: zbytes::encode(&alert.metadata),
            time: alert.time,
            actions: alert.actions.clone(),
            ttl: alert.ttl,
            ctime: alert.ctime,
            last_sent: alert.last_sent,
        }
    }

    fn into_alert(self) -> Result<Alert, PersistenceError> {
        let state = AlertState::parse(&self.state)
            .ok_or_else(|| PersistenceError::UnknownState(self.state.clone()))?;
        Ok(Alert {
            rule: self.rule,
            element: self.element,
            state,
            severity: self.severity,
            description: zbytes::decode(&self.description)?,
            metadata: zbytes::decode(&self.metadata)?,
            time: self.time,
            actions: self.actions,
            ttl: self.ttl,
            ctime: self.ctime,
            last_sent: self.last_sent,
        })
    }
}

/// Write the registry snapshot atomically: serialize to a sibling
/// `.tmp` file, then rename over the destination so a crash mid-write
/// never leaves a truncated snapshot in place.
pub fn save(path: &Path, entries: &[Alert]) -> Result<(), PersistenceError> {
    let file = SnapshotFile {
        alerts: entries.iter().map(SnapshotAlert::from_alert).collect(),
    };
    let text = toml::to_string_pretty(&file)?;
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, text)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load a snapshot, preferring the TOML format and falling back to the
/// legacy length-prefixed wire format if the file doesn't parse as TOML.
/// Duplicate identities within a snapshot are deduplicated, keeping the
/// first occurrence and logging a warning for the rest — a corrupt or
/// hand-edited snapshot should not crash the daemon on startup.
pub fn load(path: &Path) -> Result<Vec<Alert>, PersistenceError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = std::fs::read(path)?;

    let entries = match std::str::from_utf8(&bytes) {
        Ok(text) => match toml::from_str::<SnapshotFile>(text) {
            Ok(file) => file
                .alerts
                .into_iter()
                .map(SnapshotAlert::into_alert)
                .collect::<Result<Vec<_>, _>>()?,
            Err(_) => load_legacy(&bytes)?,
        },
        Err(_) => load_legacy(&bytes)?,
    };

    Ok(dedup_by_identity(entries))
}

/// The pre-TOML format: a flat concatenation of `u32`-length-prefixed
/// wire-codec records, with no surrounding structure.
fn load_legacy(bytes: &[u8]) -> Result<Vec<Alert>, PersistenceError> {
    let mut entries = Vec::new();
    let mut offset = 0usize;
    while offset + 4 <= bytes.len() {
        let len = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()) as usize;
        offset += 4;
        if offset + len > bytes.len() {
            tracing::warn!("legacy snapshot truncated, stopping at offset {offset}");
            break;
        }
        match codec::decode(&bytes[offset..offset + len]) {
            Ok(alert) => entries.push(alert),
            Err(err) => tracing::warn!("skipping corrupt legacy snapshot record: {err}"),
        }
        offset += len;
    }
    Ok(entries)
}

fn dedup_by_identity(entries: Vec<Alert>) -> Vec<Alert> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for alert in entries {
        let id = alert.identity();
        if seen.insert(id) {
            out.push(alert);
        } else {
            tracing::warn!(
                rule = %alert.rule,
                element = %alert.element,
                "dropping duplicate alert identity found in snapshot"
            );
        }
    }
    out
}
