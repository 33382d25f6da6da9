//! Wire format for pushed snapshot events.
//!
//! ```json
//! {"event": "network_points", "points": {"archethic_db_duration": 0.4}}
//! {"event": "worldmap_update", "entries": [{"region": "F1", "node_count": 3, "authorized": true}]}
//! ```
//!
//! Event logs are JSONL: one event per line, blank lines and lines starting
//! with `#` ignored.

use std::io::BufRead;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EventLogError;
use crate::schema::Snapshot;
use crate::worldmap::RegionEntry;

/// Body of a pushed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Points { points: Snapshot },
    Entries { entries: Vec<RegionEntry> },
}

/// A named event as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEvent {
    pub event: String,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl SnapshotEvent {
    pub fn points(event: impl Into<String>, points: Snapshot) -> Self {
        Self {
            event: event.into(),
            payload: EventPayload::Points { points },
        }
    }

    pub fn entries(event: impl Into<String>, entries: Vec<RegionEntry>) -> Self {
        Self {
            event: event.into(),
            payload: EventPayload::Entries { entries },
        }
    }
}

/// Parse JSONL events from `reader`; `path` is only used in error messages.
pub fn parse_event_log(
    reader: impl BufRead,
    path: &Path,
) -> Result<Vec<SnapshotEvent>, EventLogError> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| EventLogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| EventLogError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Read a JSONL event log from disk.
pub fn read_event_log(path: &Path) -> Result<Vec<SnapshotEvent>, EventLogError> {
    let file = std::fs::File::open(path).map_err(|source| EventLogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_event_log(std::io::BufReader::new(file), path)
}
