//! One live dashboard view: named events routed to boards and the worldmap.
//!
//! A [`Dashboard`] is created when a view mounts and dropped when it unmounts.
//! Nothing is shared between dashboards; a reconnecting client gets a fresh
//! instance (new session id, zero-filled windows) via [`Dashboard::reset`].

use log::{debug, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::board::{MetricBoard, MetricBoardUpdate};
use crate::config::DashboardConfig;
use crate::error::{ConfigurationError, DashboardError};
use crate::events::{EventPayload, SnapshotEvent};
use crate::schema::Snapshot;
use crate::worldmap::{RegionEntry, WorldmapRenderModel, WorldmapState};

/// What a handled event produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardUpdate {
    Board(MetricBoardUpdate),
    Worldmap(WorldmapRenderModel),
}

#[derive(Debug, Clone)]
struct BoardSlot {
    event: String,
    tick_increment: u64,
    board: MetricBoard,
}

pub struct Dashboard {
    session_id: Uuid,
    config: DashboardConfig,
    boards: Vec<BoardSlot>,
    worldmap: Option<(String, WorldmapState)>,
}

impl Dashboard {
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let boards = config
            .boards
            .iter()
            .map(|b| {
                Ok(BoardSlot {
                    event: b.event.clone(),
                    tick_increment: b.tick_increment,
                    board: b.build(&config.schema)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigurationError>>()?;
        let worldmap = config
            .worldmap_event
            .clone()
            .map(|event| (event, WorldmapState::new()));

        let session_id = Uuid::new_v4();
        debug!(
            "dashboard session {session_id} mounted with {} boards",
            boards.len()
        );
        Ok(Self {
            session_id,
            config: config.clone(),
            boards,
            worldmap,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Event names this dashboard accepts, boards first.
    pub fn event_names(&self) -> Vec<&str> {
        self.boards
            .iter()
            .map(|s| s.event.as_str())
            .chain(self.worldmap.as_ref().map(|(e, _)| e.as_str()))
            .collect()
    }

    pub fn boards(&self) -> impl Iterator<Item = &MetricBoard> {
        self.boards.iter().map(|s| &s.board)
    }

    /// Board fed by `event`.
    pub fn board(&self, event: &str) -> Option<&MetricBoard> {
        self.boards
            .iter()
            .find(|s| s.event == event)
            .map(|s| &s.board)
    }

    pub fn worldmap(&self) -> Option<&WorldmapState> {
        self.worldmap.as_ref().map(|(_, state)| state)
    }

    pub fn handle(&mut self, event: SnapshotEvent) -> Result<DashboardUpdate, DashboardError> {
        self.handle_event(&event.event, event.payload)
    }

    /// Route `payload` to whatever `name` selects.
    pub fn handle_event(
        &mut self,
        name: &str,
        payload: EventPayload,
    ) -> Result<DashboardUpdate, DashboardError> {
        if let Some(slot) = self.boards.iter_mut().find(|s| s.event == name) {
            let EventPayload::Points { points } = payload else {
                return Err(DashboardError::PayloadMismatch {
                    event: name.to_string(),
                    expected: "points",
                });
            };
            let update = slot.board.apply_snapshot(&points, slot.tick_increment);
            return Ok(DashboardUpdate::Board(update));
        }

        let session = self.session_id;
        match self.worldmap.as_mut() {
            Some((event, state)) if event == name => {
                let EventPayload::Entries { entries } = payload else {
                    return Err(DashboardError::PayloadMismatch {
                        event: name.to_string(),
                        expected: "entries",
                    });
                };
                let model = state.apply_update(entries).inspect_err(|e| {
                    warn!("dashboard {session}: {e}");
                })?;
                Ok(DashboardUpdate::Worldmap(model))
            }
            _ => Err(DashboardError::UnknownEvent {
                event: name.to_string(),
            }),
        }
    }

    /// Shorthand for a metric snapshot event.
    pub fn apply_points(
        &mut self,
        name: &str,
        points: Snapshot,
    ) -> Result<DashboardUpdate, DashboardError> {
        self.handle_event(name, EventPayload::Points { points })
    }

    /// Shorthand for a worldmap event.
    pub fn apply_entries(
        &mut self,
        name: &str,
        entries: Vec<RegionEntry>,
    ) -> Result<DashboardUpdate, DashboardError> {
        self.handle_event(name, EventPayload::Entries { entries })
    }

    /// Drop all state and start a new session from the same configuration.
    pub fn reset(&mut self) -> Result<(), ConfigurationError> {
        let previous = self.session_id;
        *self = Self::from_config(&self.config)?;
        debug!("dashboard session {previous} replaced by {}", self.session_id);
        Ok(())
    }
}
