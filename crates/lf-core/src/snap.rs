//! Snap resolver: grid snapping, neighbor alignment, and distance labels.
//!
//! Given the raw (unsnapped) top-left position of the item being dragged and
//! the rectangles of every other item, [`compute_snap`] produces the position
//! the item should be shown at, the alignment guides to draw, and the gap
//! annotations to its nearest row/column neighbors.
//!
//! Pipeline, per call:
//!
//! 1. **Grid**: round each axis to the nearest cell. Workstations always use
//!    the workstation cell (tile + gap); furniture follows the grid mode.
//! 2. **Align**: per axis, the first neighbor with an edge or center within
//!    the threshold overrides the grid result. Feature priority per neighbor:
//!    left/left, right/right, center/center (top, bottom, center vertically).
//! 3. **Clamp**: keep the whole rectangle inside the canvas.
//! 4. **Annotate**: guides for the aligned axes and distance labels for the
//!    nearest neighbor on each side.
//!
//! The function is pure: identical inputs always produce identical output.

use crate::config::EngineConfig;
use crate::model::{ItemKind, ItemRef, Position, Rect, Size};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Types ───────────────────────────────────────────────────────────────

/// Grid used for furniture while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    /// No grid rounding for furniture.
    Off,
    Fine,
    Coarse,
    /// Workstation grid. Furniture falls back to the fine grid here.
    #[default]
    Workstation,
}

/// Orientation of a guide line or the axis a gap is measured along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideAxis {
    /// A vertical line (x alignment) / a gap measured along y.
    Vertical,
    /// A horizontal line (y alignment) / a gap measured along x.
    Horizontal,
}

/// An alignment guide line.
///
/// For a vertical guide `pos` is the x coordinate and `from..to` spans y;
/// for a horizontal guide the roles swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    pub axis: GuideAxis,
    pub pos: i32,
    pub from: i32,
    pub to: i32,
}

/// Gap annotation between the dragged item and its nearest neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceLabel {
    /// Anchor point: the middle of the gap.
    pub x: i32,
    pub y: i32,
    /// Gap in pixels.
    pub distance: i32,
    pub axis: GuideAxis,
}

pub type Guides = SmallVec<[Guide; 2]>;
pub type DistanceLabels = SmallVec<[DistanceLabel; 4]>;

/// Output of [`compute_snap`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapResult {
    pub position: Position,
    pub guides: Guides,
    pub distances: DistanceLabels,
}

/// One item of the room as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedItem {
    pub item: ItemRef,
    pub rect: Rect,
}

// ─── Grid ────────────────────────────────────────────────────────────────

/// Grid cell used for `kind` under `mode`; `None` means no rounding.
pub fn grid_cell(kind: ItemKind, mode: GridMode, config: &EngineConfig) -> Option<Size> {
    match (kind, mode) {
        (ItemKind::Workstation, _) => Some(config.workstation_cell()),
        (ItemKind::Furniture, GridMode::Off) => None,
        (ItemKind::Furniture, GridMode::Coarse) => {
            Some(Size::new(config.coarse_grid, config.coarse_grid))
        }
        (ItemKind::Furniture, GridMode::Fine | GridMode::Workstation) => {
            Some(Size::new(config.fine_grid, config.fine_grid))
        }
    }
}

/// Round `v` to the nearest multiple of `cell`, halves rounding up.
pub fn snap_to(v: i32, cell: i32) -> i32 {
    if cell <= 1 {
        return v;
    }
    v.saturating_add(cell / 2).div_euclid(cell).saturating_mul(cell)
}

// ─── Resolver ────────────────────────────────────────────────────────────

/// Winning alignment on one axis: the corrected coordinate, the guide
/// position, and the neighbor it aligned with.
#[derive(Clone, Copy)]
struct AxisMatch {
    value: i32,
    guide: i32,
    neighbor: Rect,
}

/// Compute the snapped position, guides, and distance labels for `target`
/// dragged to `raw`.
///
/// `items` may include the target itself; it is skipped for comparisons and
/// supplies the target's size. A target missing from `items` is treated as a
/// workstation-sized tile.
pub fn compute_snap(
    raw: Position,
    target: ItemRef,
    grid: GridMode,
    items: &[PlacedItem],
    config: &EngineConfig,
) -> SnapResult {
    let size = items
        .iter()
        .find(|p| p.item == target)
        .map(|p| p.rect.size())
        .unwrap_or(config.workstation_size);

    // Anything past one canvas beyond an edge clamps to that edge anyway.
    let canvas = config.canvas;
    let raw = Position::new(
        raw.x.max(-canvas.width).min(canvas.width.saturating_mul(2)),
        raw.y.max(-canvas.height).min(canvas.height.saturating_mul(2)),
    );

    // 1. Grid
    let (mut x, mut y) = match grid_cell(target.kind, grid, config) {
        Some(cell) => (snap_to(raw.x, cell.width), snap_to(raw.y, cell.height)),
        None => (raw.x, raw.y),
    };

    // 2. Align
    let snapped = Rect::at(Position::new(x, y), size);
    let (x_match, y_match) = find_alignment(&snapped, target, items, config.align_threshold);
    if let Some(m) = x_match {
        x = m.value;
    }
    if let Some(m) = y_match {
        y = m.value;
    }

    // 3. Clamp
    let position = Position::new(x, y).clamp_within(size, config.canvas);
    let rect = Rect::at(position, size);

    // 4. Annotate
    let margin = config.guide_margin;
    let mut guides = Guides::new();
    if let Some(m) = x_match {
        guides.push(Guide {
            axis: GuideAxis::Vertical,
            pos: m.guide,
            from: rect.top().min(m.neighbor.top()) - margin,
            to: rect.bottom().max(m.neighbor.bottom()) + margin,
        });
    }
    if let Some(m) = y_match {
        guides.push(Guide {
            axis: GuideAxis::Horizontal,
            pos: m.guide,
            from: rect.left().min(m.neighbor.left()) - margin,
            to: rect.right().max(m.neighbor.right()) + margin,
        });
    }

    let distances = distance_labels(&rect, target, items, config);

    log::trace!(
        "snap {:?} raw=({}, {}) -> ({}, {}) guides={} dists={}",
        target.id,
        raw.x,
        raw.y,
        position.x,
        position.y,
        guides.len(),
        distances.len()
    );

    SnapResult {
        position,
        guides,
        distances,
    }
}

fn find_alignment(
    dragged: &Rect,
    target: ItemRef,
    items: &[PlacedItem],
    threshold: i32,
) -> (Option<AxisMatch>, Option<AxisMatch>) {
    let close = |a: i32, b: i32| (a - b).abs() < threshold;
    // Centers are doubled, so the threshold doubles with them.
    let close_center = |a2: i32, b2: i32| (a2 - b2).abs() < 2 * threshold;

    let mut x_match = None;
    let mut y_match = None;

    for other in items.iter().filter(|p| p.item != target) {
        let r = other.rect;

        if x_match.is_none() {
            x_match = if close(dragged.left(), r.left()) {
                Some(AxisMatch {
                    value: r.left(),
                    guide: r.left(),
                    neighbor: r,
                })
            } else if close(dragged.right(), r.right()) {
                Some(AxisMatch {
                    value: r.right() - dragged.width,
                    guide: r.right(),
                    neighbor: r,
                })
            } else if close_center(dragged.center_x2(), r.center_x2()) {
                Some(AxisMatch {
                    value: (r.center_x2() - dragged.width).div_euclid(2),
                    guide: r.center_x2().div_euclid(2),
                    neighbor: r,
                })
            } else {
                None
            };
        }

        if y_match.is_none() {
            y_match = if close(dragged.top(), r.top()) {
                Some(AxisMatch {
                    value: r.top(),
                    guide: r.top(),
                    neighbor: r,
                })
            } else if close(dragged.bottom(), r.bottom()) {
                Some(AxisMatch {
                    value: r.bottom() - dragged.height,
                    guide: r.bottom(),
                    neighbor: r,
                })
            } else if close_center(dragged.center_y2(), r.center_y2()) {
                Some(AxisMatch {
                    value: (r.center_y2() - dragged.height).div_euclid(2),
                    guide: r.center_y2().div_euclid(2),
                    neighbor: r,
                })
            } else {
                None
            };
        }

        if x_match.is_some() && y_match.is_some() {
            break;
        }
    }

    (x_match, y_match)
}

fn distance_labels(
    rect: &Rect,
    target: ItemRef,
    items: &[PlacedItem],
    config: &EngineConfig,
) -> DistanceLabels {
    let band = config.neighbor_band;
    let cap = config.distance_cap;
    // Perpendicular-center distance in real pixels from doubled centers.
    let same_row = |r: &Rect| {
        ((r.center_y2() - rect.center_y2()).abs() as f32) / 2.0 < rect.height as f32 * band
    };
    let same_col = |r: &Rect| {
        ((r.center_x2() - rect.center_x2()).abs() as f32) / 2.0 < rect.width as f32 * band
    };
    let others = || items.iter().filter(|p| p.item != target).map(|p| p.rect);
    let in_range = |gap: i32| gap > 0 && gap < cap;

    let cx = rect.center_x2().div_euclid(2);
    let cy = rect.center_y2().div_euclid(2);
    let mut out = DistanceLabels::new();

    // Left
    if let Some(gap) = others()
        .filter(|r| r.right() <= rect.left() && same_row(r))
        .map(|r| rect.left() - r.right())
        .min()
        && in_range(gap)
    {
        out.push(DistanceLabel {
            x: rect.left() - gap + gap / 2,
            y: cy,
            distance: gap,
            axis: GuideAxis::Horizontal,
        });
    }

    // Right
    if let Some(gap) = others()
        .filter(|r| r.left() >= rect.right() && same_row(r))
        .map(|r| r.left() - rect.right())
        .min()
        && in_range(gap)
    {
        out.push(DistanceLabel {
            x: rect.right() + gap / 2,
            y: cy,
            distance: gap,
            axis: GuideAxis::Horizontal,
        });
    }

    // Above
    if let Some(gap) = others()
        .filter(|r| r.bottom() <= rect.top() && same_col(r))
        .map(|r| rect.top() - r.bottom())
        .min()
        && in_range(gap)
    {
        out.push(DistanceLabel {
            x: cx,
            y: rect.top() - gap + gap / 2,
            distance: gap,
            axis: GuideAxis::Vertical,
        });
    }

    // Below
    if let Some(gap) = others()
        .filter(|r| r.top() >= rect.bottom() && same_col(r))
        .map(|r| r.top() - rect.bottom())
        .min()
        && in_range(gap)
    {
        out.push(DistanceLabel {
            x: cx,
            y: rect.bottom() + gap / 2,
            distance: gap,
            axis: GuideAxis::Vertical,
        });
    }

    out
}

// ─── Tests ───────────────────────────────────────────────────────────────
