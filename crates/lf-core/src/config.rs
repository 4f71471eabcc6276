//! Engine configuration.
//!
//! Every numeric constant the layout engine depends on lives here so the
//! embedding application can tune canvas size, grids, and thresholds without
//! touching engine code. Loading is lenient: missing JSON fields fall back
//! to the defaults.

use crate::error::{LayoutError, Result};
use crate::model::{Position, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Config ───────────────────────────────────────────────────────────────

/// Tunables for the snap resolver, templates, and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canvas size in pixels. Items are clamped inside it.
    pub canvas: Size,

    /// Inset of the default workstation grid from the canvas corner.
    pub padding: i32,

    /// Extra vertical offset above the first default workstation row.
    pub header_offset: i32,

    /// Fixed workstation tile size.
    pub workstation_size: Size,

    /// Gap between workstation tiles; tile + gap is the workstation grid cell.
    pub workstation_gap: i32,

    /// Cell size of the fine furniture grid.
    pub fine_grid: i32,

    /// Cell size of the coarse furniture grid.
    pub coarse_grid: i32,

    /// Maximum distance (exclusive) at which an edge or center aligns.
    pub align_threshold: i32,

    /// Extra length added at both ends of an alignment guide.
    pub guide_margin: i32,

    /// Gaps at or above this value get no distance label.
    pub distance_cap: i32,

    /// Neighbors count as "same row/column" when their center lies within
    /// this multiple of the dragged item's own size.
    pub neighbor_band: f32,

    /// Maximum snapshots kept per room.
    pub history_depth: usize,

    /// Displacement applied to duplicated furniture.
    pub duplicate_offset: Position,

    /// Default template column count per room.
    pub room_columns: BTreeMap<String, u32>,

    /// Column count for rooms missing from `room_columns`.
    pub default_columns: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let room_columns = [
            ("cl1", 7),
            ("cl2", 7),
            ("cl3", 7),
            ("cl4", 6),
            ("cl5", 6),
            ("nl1", 6),
            ("sl1", 6),
            ("sl2", 6),
            ("emc", 6),
        ]
        .into_iter()
        .map(|(room, cols)| (room.to_string(), cols))
        .collect();

        Self {
            canvas: Size::new(820, 520),
            padding: 30,
            header_offset: 30,
            workstation_size: Size::new(44, 38),
            workstation_gap: 8,
            fine_grid: 10,
            coarse_grid: 20,
            align_threshold: 6,
            guide_margin: 4,
            distance_cap: 120,
            neighbor_band: 1.2,
            history_depth: 40,
            duplicate_offset: Position::new(20, 20),
            room_columns,
            default_columns: 6,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    ///
    /// # Errors
    /// Returns [`LayoutError::Json`] for malformed JSON and
    /// [`LayoutError::InvalidConfig`] for values the engine cannot use.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero or negative sizes that would break snapping or clamping.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("canvas.width", self.canvas.width),
            ("canvas.height", self.canvas.height),
            ("workstation_size.width", self.workstation_size.width),
            ("workstation_size.height", self.workstation_size.height),
            ("fine_grid", self.fine_grid),
            ("coarse_grid", self.coarse_grid),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| *v <= 0) {
            return Err(LayoutError::InvalidConfig(format!(
                "{name} must be positive, got {value}"
            )));
        }
        if self.workstation_gap < 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "workstation_gap must not be negative, got {}",
                self.workstation_gap
            )));
        }
        if self.history_depth == 0 {
            return Err(LayoutError::InvalidConfig(
                "history_depth must be at least 1".to_string(),
            ));
        }
        if self.default_columns == 0 || self.room_columns.values().any(|c| *c == 0) {
            return Err(LayoutError::InvalidConfig(
                "column counts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Workstation grid cell: tile plus gap on each axis.
    pub fn workstation_cell(&self) -> Size {
        Size::new(
            self.workstation_size.width + self.workstation_gap,
            self.workstation_size.height + self.workstation_gap,
        )
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
