//! Worldmap state: per-region node counts with color/size ranges.

use serde::{Deserialize, Serialize};

use crate::error::EmptyUpdateError;

/// Nodes located in one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub region: String,
    pub node_count: u64,
    pub authorized: bool,
    /// Geo patch identifier, passed through for tooltips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_patch: Option<String>,
}

impl RegionEntry {
    pub fn new(region: impl Into<String>, node_count: u64, authorized: bool) -> Self {
        Self {
            region: region.into(),
            node_count,
            authorized,
            geo_patch: None,
        }
    }
}

/// Inclusive node count range used to scale a partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRange {
    pub min: u64,
    pub max: u64,
}

impl NodeRange {
    /// Range over `counts`; `{0, 0}` when empty.
    fn over(counts: impl Iterator<Item = u64>) -> Self {
        counts
            .fold(None, |acc: Option<Self>, n| {
                Some(match acc {
                    Some(r) => Self {
                        min: r.min.min(n),
                        max: r.max.max(n),
                    },
                    None => Self { min: n, max: n },
                })
            })
            .unwrap_or_default()
    }
}

/// What a worldmap sink draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldmapRenderModel {
    pub authorized_entries: Vec<RegionEntry>,
    pub pending_entries: Vec<RegionEntry>,
    pub authorized_range: NodeRange,
    pub pending_range: NodeRange,
}

/// Last accepted worldmap model. Each update replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct WorldmapState {
    model: WorldmapRenderModel,
}

impl WorldmapState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored entries and recompute both ranges.
    ///
    /// An empty update is refused so the map keeps its last scale instead of
    /// collapsing to `0..0`.
    pub fn apply_update(
        &mut self,
        entries: Vec<RegionEntry>,
    ) -> Result<WorldmapRenderModel, EmptyUpdateError> {
        if entries.is_empty() {
            return Err(EmptyUpdateError);
        }

        let (authorized_entries, pending_entries): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.authorized);
        let authorized_range = NodeRange::over(authorized_entries.iter().map(|e| e.node_count));
        let pending_range = NodeRange::over(pending_entries.iter().map(|e| e.node_count));

        self.model = WorldmapRenderModel {
            authorized_entries,
            pending_entries,
            authorized_range,
            pending_range,
        };
        Ok(self.model.clone())
    }

    pub fn render(&self) -> &WorldmapRenderModel {
        &self.model
    }

    pub fn total_nodes(&self) -> u64 {
        self.model
            .authorized_entries
            .iter()
            .chain(&self.model.pending_entries)
            .map(|e| e.node_count)
            .sum()
    }
}
