//! Editor state → drawable room frame.
//!
//! Projects a room's resolved layout, selection, lock and group state, and
//! the live drag session into plain geometry for whatever paints the canvas.
//! Tiles are listed in paint order: furniture, then workstations, then the
//! items being dragged. Hit testing walks the same list backwards.

use kurbo::{Line, Point, Size};
use lf_core::id::RoomId;
use lf_core::model::{
    ItemRef, Position, RoomLayout, WorkstationCondition, WorkstationStatus,
};
use lf_core::snap::{GridMode, GuideAxis, grid_cell};
use lf_editor::Editor;
use peniko::Color;

/// Guide lines and distance badges.
pub const GUIDE_COLOR: Color = Color::from_rgb8(0xf5, 0x9e, 0x0b);

/// Distance badge box, centered on the gap midpoint.
const BADGE_SIZE: Size = Size::new(28.0, 14.0);

// ─── Frame ───────────────────────────────────────────────────────────────

/// One drawable item.
#[derive(Debug, Clone)]
pub struct TileFrame {
    pub item: ItemRef,
    pub rect: kurbo::Rect,
    pub label: String,
    pub locked: bool,
    pub selected: bool,
    /// Moving with the active drag (target or group follower).
    pub dragging: bool,
    /// Outline color of the item's group.
    pub group_color: Option<Color>,
    /// Workstation status fill; `None` for furniture.
    pub status_tint: Option<Color>,
    /// Workstation condition dot; `None` for furniture.
    pub condition_dot: Option<Color>,
}

/// Gap annotation shown while dragging.
#[derive(Debug, Clone)]
pub struct DistanceBadge {
    pub rect: kurbo::Rect,
    pub text: String,
    pub distance: i32,
}

/// Everything needed to draw one room.
#[derive(Debug, Clone)]
pub struct RoomFrame {
    pub room: RoomId,
    pub canvas: Size,
    pub edit_mode: bool,
    /// Background grid cell; only in edit mode with a grid enabled.
    pub grid: Option<Size>,
    pub tiles: Vec<TileFrame>,
    pub guides: Vec<Line>,
    pub badges: Vec<DistanceBadge>,
}

impl RoomFrame {
    pub fn tile(&self, item: ItemRef) -> Option<&TileFrame> {
        self.tiles.iter().find(|t| t.item == item)
    }
}

// ─── Projection ──────────────────────────────────────────────────────────

/// Build the frame for `room` from the editor's current state.
pub fn project_room(editor: &Editor, room: RoomId) -> RoomFrame {
    let config = editor.config();
    let layout = editor.resolved_layout(room);
    let session = editor.drag_session().filter(|s| s.room == room);

    // Live positions of everything the drag is carrying.
    let mut live: Vec<(ItemRef, Position)> = Vec::new();
    if let Some(s) = session {
        live.push((s.target, s.position));
        live.extend(s.follower_positions());
    }
    let live_position = |item: ItemRef| {
        live.iter()
            .find(|(i, _)| *i == item)
            .map(|(_, p)| *p)
    };

    let tile = |item: ItemRef, position: Position, size: lf_core::model::Size, label: String| {
        let moving = live_position(item);
        let origin = moving.unwrap_or(position);
        TileFrame {
            item,
            rect: to_kurbo(origin, size),
            label,
            locked: layout.is_locked(item),
            selected: editor.selection().contains(item),
            dragging: moving.is_some(),
            group_color: group_color(&layout, item),
            status_tint: None,
            condition_dot: None,
        }
    };

    let mut tiles: Vec<TileFrame> = layout
        .furniture
        .iter()
        .map(|f| tile(f.item_ref(), f.position, f.size, f.label.clone()))
        .collect();

    for ws in editor.inventory(room) {
        let Some(position) = layout.workstation_positions.get(&ws.id) else {
            continue;
        };
        tiles.push(TileFrame {
            status_tint: Some(status_color(ws.status)),
            condition_dot: Some(condition_color(ws.condition)),
            ..tile(
                ws.item_ref(),
                *position,
                config.workstation_size,
                format!("PC {:02}", ws.number),
            )
        });
    }

    // Dragged tiles paint above everything else; the sort is stable.
    tiles.sort_by_key(|t| t.dragging);

    let guides: Vec<Line> = session
        .map(|s| {
            s.guides
                .iter()
                .map(|g| {
                    let (pos, from, to) = (f64::from(g.pos), f64::from(g.from), f64::from(g.to));
                    match g.axis {
                        GuideAxis::Vertical => Line::new((pos, from), (pos, to)),
                        GuideAxis::Horizontal => Line::new((from, pos), (to, pos)),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let badges: Vec<DistanceBadge> = session
        .map(|s| {
            s.distances
                .iter()
                .map(|d| DistanceBadge {
                    rect: kurbo::Rect::from_center_size(
                        Point::new(f64::from(d.x), f64::from(d.y)),
                        BADGE_SIZE,
                    ),
                    text: format!("{}px", d.distance),
                    distance: d.distance,
                })
                .collect()
        })
        .unwrap_or_default();

    let grid = match editor.grid_mode() {
        _ if !editor.is_edit_mode() => None,
        GridMode::Off => None,
        GridMode::Workstation => Some(config.workstation_cell()),
        mode => grid_cell(lf_core::model::ItemKind::Furniture, mode, config),
    }
    .map(|cell| Size::new(f64::from(cell.width), f64::from(cell.height)));

    log::trace!(
        "project {room}: {} tiles, {} guides, {} badges",
        tiles.len(),
        guides.len(),
        badges.len()
    );

    RoomFrame {
        room,
        canvas: Size::new(
            f64::from(config.canvas.width),
            f64::from(config.canvas.height),
        ),
        edit_mode: editor.is_edit_mode(),
        grid,
        tiles,
        guides,
        badges,
    }
}

fn to_kurbo(origin: Position, size: lf_core::model::Size) -> kurbo::Rect {
    kurbo::Rect::from_origin_size(
        (f64::from(origin.x), f64::from(origin.y)),
        (f64::from(size.width), f64::from(size.height)),
    )
}

fn group_color(layout: &RoomLayout, item: ItemRef) -> Option<Color> {
    let group = layout.group(layout.group_of(item)?)?;
    let color = parse_hex(&group.color);
    if color.is_none() {
        log::warn!("project: group {} has unusable color {:?}", group.id, group.color);
    }
    color
}

/// Parse `#rrggbb`.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let [_, r, g, b] = value.to_be_bytes();
    Some(Color::from_rgb8(r, g, b))
}

pub fn status_color(status: WorkstationStatus) -> Color {
    match status {
        WorkstationStatus::Available => Color::from_rgb8(0x22, 0xc5, 0x5e),
        WorkstationStatus::Occupied => Color::from_rgb8(0xf5, 0x9e, 0x0b),
        WorkstationStatus::Maintenance => Color::from_rgb8(0xf4, 0x3f, 0x5e),
    }
}

pub fn condition_color(condition: WorkstationCondition) -> Color {
    match condition {
        WorkstationCondition::Good => Color::from_rgb8(0x22, 0xc5, 0x5e),
        WorkstationCondition::Lagging => Color::from_rgb8(0xf5, 0x9e, 0x0b),
        WorkstationCondition::NeedsRepair => Color::from_rgb8(0xf9, 0x73, 0x16),
        WorkstationCondition::Damaged => Color::from_rgb8(0xf4, 0x3f, 0x5e),
    }
}
