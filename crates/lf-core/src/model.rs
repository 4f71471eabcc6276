//! Floor-plan data model.
//!
//! A room's floor plan is a flat set of movable items on a bounded canvas:
//! fixed-size workstation tiles (one per physical PC) and variable-size
//! furniture. `RoomLayout` is the durable per-room aggregate; its clone is
//! the snapshot type used by undo/redo.

use crate::id::{GroupId, ItemId};
use crate::snap::PlacedItem;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ─── Geometry ────────────────────────────────────────────────────────────

/// Integer-pixel top-left coordinate on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Keep an item of `size` inside `bounds`; oversized items pin to 0.
    pub fn clamp_within(self, size: Size, bounds: Size) -> Self {
        Self {
            x: self.x.min(bounds.width - size.width).max(0),
            y: self.y.min(bounds.height - size.height).max(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn at(origin: Position, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub const fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Horizontal center, doubled so odd widths stay exact in integers.
    pub const fn center_x2(&self) -> i32 {
        2 * self.x + self.width
    }

    /// Vertical center, doubled.
    pub const fn center_y2(&self) -> i32 {
        2 * self.y + self.height
    }

    /// Check if a point is inside this rectangle (edges inclusive).
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.left() && px <= self.right() && py >= self.top() && py <= self.bottom()
    }

    /// Check if this rectangle overlaps another (touching edges do not count).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

// ─── Item references ─────────────────────────────────────────────────────

/// Which variant of movable item an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Workstation,
    Furniture,
}

/// Reference to a movable item, unique by `(id, kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: ItemId,
    pub kind: ItemKind,
}

impl ItemRef {
    pub const fn new(id: ItemId, kind: ItemKind) -> Self {
        Self { id, kind }
    }

    pub fn workstation(id: impl Into<ItemId>) -> Self {
        Self::new(id.into(), ItemKind::Workstation)
    }

    pub fn furniture(id: impl Into<ItemId>) -> Self {
        Self::new(id.into(), ItemKind::Furniture)
    }

    pub fn is_workstation(&self) -> bool {
        self.kind == ItemKind::Workstation
    }
}

// ─── Workstations (inventory) ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkstationStatus {
    Available,
    Occupied,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkstationCondition {
    Good,
    Lagging,
    NeedsRepair,
    Damaged,
}

/// Inventory record for one physical PC.
///
/// Owned by the inventory subsystem; the engine only reads it to know which
/// tiles exist, in what order, and what to display on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workstation {
    pub id: ItemId,
    pub number: u32,
    pub status: WorkstationStatus,
    pub condition: WorkstationCondition,
}

impl Workstation {
    pub fn new(id: impl Into<ItemId>, number: u32) -> Self {
        Self {
            id: id.into(),
            number,
            status: WorkstationStatus::Available,
            condition: WorkstationCondition::Good,
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.id, ItemKind::Workstation)
    }
}

// ─── Furniture ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FurnitureKind {
    Table,
    Door,
    Aircon,
    Server,
    Router,
    Wifi,
    #[serde(rename = "smarttv")]
    SmartTv,
}

impl FurnitureKind {
    pub const ALL: [FurnitureKind; 7] = [
        FurnitureKind::Table,
        FurnitureKind::Door,
        FurnitureKind::Aircon,
        FurnitureKind::Server,
        FurnitureKind::Router,
        FurnitureKind::Wifi,
        FurnitureKind::SmartTv,
    ];

    /// Stable lowercase name, also used when minting ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            FurnitureKind::Table => "table",
            FurnitureKind::Door => "door",
            FurnitureKind::Aircon => "aircon",
            FurnitureKind::Server => "server",
            FurnitureKind::Router => "router",
            FurnitureKind::Wifi => "wifi",
            FurnitureKind::SmartTv => "smarttv",
        }
    }

    /// Size given to a freshly added item of this kind.
    pub fn catalog_size(&self) -> Size {
        match self {
            FurnitureKind::Table => Size::new(120, 40),
            FurnitureKind::Door => Size::new(36, 50),
            FurnitureKind::Aircon => Size::new(70, 26),
            FurnitureKind::Server => Size::new(50, 80),
            FurnitureKind::Router => Size::new(60, 34),
            FurnitureKind::Wifi => Size::new(54, 34),
            FurnitureKind::SmartTv => Size::new(90, 50),
        }
    }

    pub fn catalog_label(&self) -> &'static str {
        match self {
            FurnitureKind::Table => "Table",
            FurnitureKind::Door => "Door",
            FurnitureKind::Aircon => "Aircon",
            FurnitureKind::Server => "Server",
            FurnitureKind::Router => "Router",
            FurnitureKind::Wifi => "WiFi AP",
            FurnitureKind::SmartTv => "Smart TV",
        }
    }
}

/// A non-PC fixture placed on the floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Furniture {
    pub id: ItemId,
    pub kind: FurnitureKind,
    pub position: Position,
    pub size: Size,
    pub label: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
}

impl Furniture {
    pub fn new(
        id: impl Into<ItemId>,
        kind: FurnitureKind,
        position: Position,
        size: Size,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            size,
            label: label.into(),
            locked: false,
            group: None,
        }
    }

    /// Catalog item of `kind`, centered on a canvas of `canvas` size.
    pub fn from_catalog(id: ItemId, kind: FurnitureKind, canvas: Size) -> Self {
        let size = kind.catalog_size();
        let position = Position::new(
            canvas.width / 2 - size.width / 2,
            canvas.height / 2 - size.height / 2,
        );
        Self::new(id, kind, position, size, kind.catalog_label())
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.position, self.size)
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.id, ItemKind::Furniture)
    }
}

// ─── Groups ──────────────────────────────────────────────────────────────

/// Colors assigned to groups in creation order, wrapping around.
pub const GROUP_PALETTE: [&str; 6] = [
    "#6366F1", "#EC4899", "#14B8A6", "#F59E0B", "#8B5CF6", "#0EA5E9",
];

/// Palette color for the `index`-th group of a room.
pub fn group_color(index: usize) -> &'static str {
    GROUP_PALETTE[index % GROUP_PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub label: String,
    /// Hex color, one of [`GROUP_PALETTE`].
    pub color: String,
}

// ─── Room layout ─────────────────────────────────────────────────────────

/// Durable floor-plan state of one room.
///
/// Every group id referenced by a workstation or furniture item exists in
/// `groups`; the group/ungroup/remove operations maintain this.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomLayout {
    pub workstation_positions: BTreeMap<ItemId, Position>,
    #[serde(default)]
    pub locked_workstations: BTreeSet<ItemId>,
    #[serde(default)]
    pub workstation_groups: BTreeMap<ItemId, GroupId>,
    #[serde(default)]
    pub furniture: Vec<Furniture>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl RoomLayout {
    pub fn new(workstation_positions: BTreeMap<ItemId, Position>, furniture: Vec<Furniture>) -> Self {
        Self {
            workstation_positions,
            furniture,
            ..Self::default()
        }
    }

    pub fn furniture(&self, id: ItemId) -> Option<&Furniture> {
        self.furniture.iter().find(|f| f.id == id)
    }

    pub fn furniture_mut(&mut self, id: ItemId) -> Option<&mut Furniture> {
        self.furniture.iter_mut().find(|f| f.id == id)
    }

    /// Whether the layout knows this item.
    pub fn contains(&self, item: ItemRef) -> bool {
        match item.kind {
            ItemKind::Workstation => self.workstation_positions.contains_key(&item.id),
            ItemKind::Furniture => self.furniture(item.id).is_some(),
        }
    }

    /// Whether `id` is already used by any item of this room.
    pub fn is_id_taken(&self, id: ItemId) -> bool {
        self.workstation_positions.contains_key(&id) || self.furniture(id).is_some()
    }

    pub fn position_of(&self, item: ItemRef) -> Option<Position> {
        match item.kind {
            ItemKind::Workstation => self.workstation_positions.get(&item.id).copied(),
            ItemKind::Furniture => self.furniture(item.id).map(|f| f.position),
        }
    }

    /// Overwrite an item's position. Returns `false` for unknown items.
    pub fn set_position(&mut self, item: ItemRef, position: Position) -> bool {
        match item.kind {
            ItemKind::Workstation => match self.workstation_positions.get_mut(&item.id) {
                Some(p) => {
                    *p = position;
                    true
                }
                None => false,
            },
            ItemKind::Furniture => match self.furniture_mut(item.id) {
                Some(f) => {
                    f.position = position;
                    true
                }
                None => false,
            },
        }
    }

    /// Item bounds, using `workstation_size` for workstation tiles.
    pub fn rect_of(&self, item: ItemRef, workstation_size: Size) -> Option<Rect> {
        match item.kind {
            ItemKind::Workstation => self
                .workstation_positions
                .get(&item.id)
                .map(|p| Rect::at(*p, workstation_size)),
            ItemKind::Furniture => self.furniture(item.id).map(Furniture::rect),
        }
    }

    pub fn is_locked(&self, item: ItemRef) -> bool {
        match item.kind {
            ItemKind::Workstation => self.locked_workstations.contains(&item.id),
            ItemKind::Furniture => self.furniture(item.id).is_some_and(|f| f.locked),
        }
    }

    /// Set the lock flag. Returns `true` if the flag changed.
    pub fn set_locked(&mut self, item: ItemRef, locked: bool) -> bool {
        match item.kind {
            ItemKind::Workstation => {
                if !self.workstation_positions.contains_key(&item.id) {
                    return false;
                }
                if locked {
                    self.locked_workstations.insert(item.id)
                } else {
                    self.locked_workstations.remove(&item.id)
                }
            }
            ItemKind::Furniture => match self.furniture_mut(item.id) {
                Some(f) if f.locked != locked => {
                    f.locked = locked;
                    true
                }
                _ => false,
            },
        }
    }

    pub fn group_of(&self, item: ItemRef) -> Option<GroupId> {
        match item.kind {
            ItemKind::Workstation => self.workstation_groups.get(&item.id).copied(),
            ItemKind::Furniture => self.furniture(item.id).and_then(|f| f.group),
        }
    }

    /// Set or clear group membership. Returns `true` if membership changed.
    pub fn set_group(&mut self, item: ItemRef, group: Option<GroupId>) -> bool {
        match item.kind {
            ItemKind::Workstation => {
                if !self.workstation_positions.contains_key(&item.id) {
                    return false;
                }
                let previous = match group {
                    Some(g) => self.workstation_groups.insert(item.id, g),
                    None => self.workstation_groups.remove(&item.id),
                };
                previous != group
            }
            ItemKind::Furniture => match self.furniture_mut(item.id) {
                Some(f) if f.group != group => {
                    f.group = group;
                    true
                }
                _ => false,
            },
        }
    }

    /// Every item as the snap resolver sees it: the given workstations in
    /// inventory order, then furniture in paint order. Stored positions of
    /// workstations outside `workstations` are left out.
    pub fn placed_items(
        &self,
        workstations: &[Workstation],
        workstation_size: Size,
    ) -> Vec<PlacedItem> {
        let workstations = workstations.iter().filter_map(|ws| {
            let position = self.workstation_positions.get(&ws.id)?;
            Some(PlacedItem {
                item: ws.item_ref(),
                rect: Rect::at(*position, workstation_size),
            })
        });
        let furniture = self.furniture.iter().map(|f| PlacedItem {
            item: f.item_ref(),
            rect: f.rect(),
        });
        workstations.chain(furniture).collect()
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// All items referencing `group`, workstations first.
    pub fn members_of(&self, group: GroupId) -> Vec<ItemRef> {
        let workstations = self
            .workstation_groups
            .iter()
            .filter(|(_, g)| **g == group)
            .map(|(id, _)| ItemRef::new(*id, ItemKind::Workstation));
        let furniture = self
            .furniture
            .iter()
            .filter(|f| f.group == Some(group))
            .map(Furniture::item_ref);
        workstations.chain(furniture).collect()
    }

    /// Delete groups no item references anymore. Returns how many were removed.
    pub fn prune_empty_groups(&mut self) -> usize {
        let referenced: BTreeSet<GroupId> = self
            .workstation_groups
            .values()
            .copied()
            .chain(self.furniture.iter().filter_map(|f| f.group))
            .collect();
        let before = self.groups.len();
        self.groups.retain(|g| referenced.contains(&g.id));
        before - self.groups.len()
    }
}
