//! Default room templates.
//!
//! A room that has never been edited is drawn from a deterministic template:
//! workstations in a row-major grid whose column count depends on the room,
//! and a fixed furniture set (instructor table, door, air conditioner,
//! router, access point) placed by offsets from the canvas corners and
//! center. Saved layouts are overlaid on top of the template.

use crate::config::EngineConfig;
use crate::id::{ItemId, RoomId};
use crate::model::{Furniture, FurnitureKind, Position, RoomLayout, Size, Workstation};
use std::collections::BTreeMap;

/// Template column count for `room`.
pub fn column_count(room: RoomId, config: &EngineConfig) -> u32 {
    config
        .room_columns
        .get(room.as_str())
        .copied()
        .unwrap_or(config.default_columns)
        .max(1)
}

/// Row-major default positions for the room's workstations, in inventory order.
pub fn default_positions(
    workstations: &[Workstation],
    room: RoomId,
    config: &EngineConfig,
) -> BTreeMap<ItemId, Position> {
    let cols = column_count(room, config) as usize;
    let cell = config.workstation_cell();
    workstations
        .iter()
        .enumerate()
        .map(|(i, ws)| {
            let col = (i % cols) as i32;
            let row = (i / cols) as i32;
            let position = Position::new(
                config.padding + col * cell.width,
                config.padding + config.header_offset + row * cell.height,
            );
            (ws.id, position)
        })
        .collect()
}

/// The fixed furniture set every room starts with.
pub fn default_furniture(room: RoomId, config: &EngineConfig) -> Vec<Furniture> {
    let w = config.canvas.width;
    let h = config.canvas.height;
    let id = |suffix: &str| ItemId::intern(&format!("{room}-{suffix}"));

    vec![
        Furniture::new(
            id("instr"),
            FurnitureKind::Table,
            Position::new(w / 2 - 65, h - 70),
            Size::new(130, 40),
            "Instructor's Station",
        ),
        Furniture::new(
            id("door"),
            FurnitureKind::Door,
            Position::new(w - 55, h - 70),
            Size::new(36, 50),
            "Door",
        ),
        Furniture::new(
            id("ac1"),
            FurnitureKind::Aircon,
            Position::new(w - 90, 8),
            Size::new(70, 26),
            "Aircon",
        ),
        Furniture::new(
            id("router"),
            FurnitureKind::Router,
            Position::new(10, 8),
            Size::new(60, 34),
            "Router",
        ),
        Furniture::new(
            id("wifi"),
            FurnitureKind::Wifi,
            Position::new(80, 8),
            Size::new(54, 34),
            "WiFi AP",
        ),
    ]
}

/// Full template layout: default positions and default furniture, no locks
/// or groups.
pub fn default_layout(workstations: &[Workstation], room: RoomId, config: &EngineConfig) -> RoomLayout {
    RoomLayout::new(
        default_positions(workstations, room, config),
        default_furniture(room, config),
    )
}

/// Overlay a saved layout on the template.
///
/// Saved workstation positions win over defaults for the same id; workstations
/// added to the inventory after the layout was saved keep their default
/// position. Saved furniture, locks, groups, and group assignments replace the
/// template's wholesale.
pub fn merge_with_defaults(saved: Option<&RoomLayout>, defaults: RoomLayout) -> RoomLayout {
    let Some(saved) = saved else {
        return defaults;
    };
    let mut positions = defaults.workstation_positions;
    positions.extend(saved.workstation_positions.iter().map(|(id, p)| (*id, *p)));
    RoomLayout {
        workstation_positions: positions,
        locked_workstations: saved.locked_workstations.clone(),
        workstation_groups: saved.workstation_groups.clone(),
        furniture: saved.furniture.clone(),
        groups: saved.groups.clone(),
    }
}
