//! Static dashboard configuration.
//!
//! A dashboard is described once, up front: the metric schema, the boards
//! (which event feeds each one, how far its x-axis advances per snapshot, and
//! which widget backs each metric), and optionally the event carrying worldmap
//! data. The description is plain JSON so deployments can ship their own.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::board::{MetricBoard, MetricConfig};
use crate::error::{ConfigLoadError, ConfigurationError};
use crate::schema::MetricSchema;

/// One board and the event that feeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub event: String,
    pub tick_increment: u64,
    pub metrics: BTreeMap<String, MetricConfig>,
}

impl BoardConfig {
    pub fn build(&self, schema: &MetricSchema) -> Result<MetricBoard, ConfigurationError> {
        if self.tick_increment == 0 {
            return Err(ConfigurationError::ZeroTickIncrement {
                board: self.name.clone(),
            });
        }
        MetricBoard::new(self.name.clone(), schema.clone(), &self.metrics)
    }
}

/// Full description of one dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub schema: MetricSchema,
    pub boards: Vec<BoardConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worldmap_event: Option<String>,
}

impl DashboardConfig {
    /// Check everything that would make dashboard construction fail.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.boards.is_empty() {
            return Err(ConfigurationError::EmptyDashboard);
        }

        let mut seen = HashSet::new();
        let events = self
            .boards
            .iter()
            .map(|b| b.event.as_str())
            .chain(self.worldmap_event.as_deref());
        for event in events {
            if !seen.insert(event) {
                return Err(ConfigurationError::DuplicateEvent {
                    event: event.to_string(),
                });
            }
        }

        let mut names = HashSet::new();
        for board in &self.boards {
            if !names.insert(board.name.as_str()) {
                return Err(ConfigurationError::DuplicateBoard {
                    board: board.name.clone(),
                });
            }
            board.build(&self.schema)?;
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Read, parse and validate a dashboard configuration file.
pub fn load_dashboard_config(path: &Path) -> Result<DashboardConfig, ConfigLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: DashboardConfig =
        serde_json::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate().map_err(|source| ConfigLoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "loaded dashboard config from {}: {} boards, {} metrics",
        path.display(),
        config.boards.len(),
        config.schema.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal() -> DashboardConfig {
        DashboardConfig {
            schema: MetricSchema::with_keys(["a", "b"]),
            boards: vec![BoardConfig {
                name: "main".to_string(),
                event: "points".to_string(),
                tick_increment: 2,
                metrics: BTreeMap::from([
                    ("a".to_string(), MetricConfig::series(10)),
                    ("b".to_string(), MetricConfig::gauge()),
                ]),
            }],
            worldmap_event: Some("map".to_string()),
        }
    }

    #[test]
    fn test_minimal_is_valid() {
        assert_eq!(minimal().validate(), Ok(()));
    }

    #[test]
    fn test_no_boards_rejected() {
        let mut cfg = minimal();
        cfg.boards.clear();
        assert_eq!(cfg.validate(), Err(ConfigurationError::EmptyDashboard));
    }

    #[test]
    fn test_duplicate_event_rejected() {
        let mut cfg = minimal();
        cfg.worldmap_event = Some("points".to_string());
        assert_eq!(
            cfg.validate(),
            Err(ConfigurationError::DuplicateEvent {
                event: "points".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_board_name_rejected() {
        let mut cfg = minimal();
        let mut second = cfg.boards[0].clone();
        second.event = "other_points".to_string();
        second.metrics = BTreeMap::from([("b".to_string(), MetricConfig::gauge())]);
        cfg.boards.push(second);
        assert_eq!(
            cfg.validate(),
            Err(ConfigurationError::DuplicateBoard {
                board: "main".to_string()
            })
        );

        cfg.boards[1].name = "side".to_string();
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let mut cfg = minimal();
        cfg.boards[0].tick_increment = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigurationError::ZeroTickIncrement { .. })
        ));
    }

    #[test]
    fn test_load_round_trip() {
        let cfg = minimal();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(cfg.to_json_pretty().unwrap().as_bytes())
            .unwrap();
        let loaded = load_dashboard_config(file.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dashboard_config(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io { .. }));
    }

    #[test]
    fn test_load_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = load_dashboard_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { .. }));
    }

    #[test]
    fn test_load_invalid_config() {
        let mut cfg = minimal();
        cfg.boards[0]
            .metrics
            .insert("missing".to_string(), MetricConfig::card());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_vec(&cfg).unwrap().as_slice())
            .unwrap();
        let err = load_dashboard_config(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Invalid {
                source: ConfigurationError::UnknownMetric { .. },
                ..
            }
        ));
    }
}
