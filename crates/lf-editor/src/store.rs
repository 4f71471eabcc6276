//! Layout state store: the single owner of committed room layouts.
//!
//! Operations here are raw mutations. They never touch history; the
//! [`Editor`](crate::editor::Editor) pushes a snapshot before calling them.
//! Every operation returns whether it changed anything, and anything that
//! cannot apply (unknown room, unknown item, locked item) is a no-op.
//!
//! Locks are enforced here: position updates and batch moves that target a
//! locked item are rejected.

use lf_core::id::{GroupId, ItemId, RoomId};
use lf_core::model::*;
use lf_core::persist::LayoutDocument;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A write the persistence collaborator still has to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    Save(RoomId, RoomLayout),
    Delete(RoomId),
}

impl PendingWrite {
    pub fn room(&self) -> RoomId {
        match self {
            PendingWrite::Save(room, _) | PendingWrite::Delete(room) => *room,
        }
    }
}

pub struct LayoutStore {
    layouts: HashMap<RoomId, RoomLayout>,
    /// Rooms changed since the last [`take_dirty`](Self::take_dirty).
    touched: BTreeSet<RoomId>,
    /// Canvas size, for clamping duplicated furniture.
    bounds: Size,
}

impl LayoutStore {
    pub fn new(bounds: Size) -> Self {
        Self {
            layouts: HashMap::new(),
            touched: BTreeSet::new(),
            bounds,
        }
    }

    /// Replace all layouts with persisted ones. Loading is not a change.
    pub fn load(&mut self, document: LayoutDocument) {
        self.layouts = document.into_iter().collect();
        self.touched.clear();
    }

    pub fn layout(&self, room: RoomId) -> Option<&RoomLayout> {
        self.layouts.get(&room)
    }

    pub fn has_layout(&self, room: RoomId) -> bool {
        self.layouts.contains_key(&room)
    }

    /// Rooms that currently have a layout, sorted.
    pub fn rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.layouts.keys().copied().collect();
        rooms.sort();
        rooms
    }

    fn layout_mut(&mut self, room: RoomId) -> Option<&mut RoomLayout> {
        let layout = self.layouts.get_mut(&room);
        if layout.is_none() {
            log::trace!("store: {room} has no layout yet");
        }
        layout
    }

    fn touch(&mut self, room: RoomId) {
        self.touched.insert(room);
    }

    /// Queue `room` for the next [`take_dirty`](Self::take_dirty) again,
    /// e.g. after a failed write.
    pub fn mark_dirty(&mut self, room: RoomId) {
        self.touch(room);
    }

    // ─── Whole-layout operations ─────────────────────────────────────────

    /// Set a room's layout wholesale (first edit of a room).
    pub fn init_layout(
        &mut self,
        room: RoomId,
        workstation_positions: BTreeMap<ItemId, Position>,
        furniture: Vec<Furniture>,
    ) {
        log::debug!(
            "store: init {room} ({} workstations, {} furniture)",
            workstation_positions.len(),
            furniture.len()
        );
        self.layouts
            .insert(room, RoomLayout::new(workstation_positions, furniture));
        self.touch(room);
    }

    /// Restore a snapshot (undo/redo).
    pub fn replace_layout(&mut self, room: RoomId, layout: RoomLayout) {
        self.layouts.insert(room, layout);
        self.touch(room);
    }

    /// Forget a room's layout so reads fall back to the template.
    pub fn reset_layout(&mut self, room: RoomId) -> bool {
        let removed = self.layouts.remove(&room).is_some();
        if removed {
            log::debug!("store: reset {room}");
            self.touch(room);
        }
        removed
    }

    /// Writes accumulated since the last call, in room order.
    pub fn take_dirty(&mut self) -> Vec<PendingWrite> {
        std::mem::take(&mut self.touched)
            .into_iter()
            .map(|room| match self.layouts.get(&room) {
                Some(layout) => PendingWrite::Save(room, layout.clone()),
                None => PendingWrite::Delete(room),
            })
            .collect()
    }

    // ─── Positions ───────────────────────────────────────────────────────

    /// Move a workstation. The layout gains an entry for workstations that
    /// joined the inventory after it was saved.
    pub fn update_workstation_position(&mut self, room: RoomId, id: ItemId, pos: Position) -> bool {
        let Some(layout) = self.layout_mut(room) else {
            return false;
        };
        if layout.locked_workstations.contains(&id) {
            log::warn!("store: workstation {id} is locked, move rejected");
            return false;
        }
        if layout.workstation_positions.insert(id, pos) == Some(pos) {
            return false;
        }
        self.touch(room);
        true
    }

    pub fn update_furniture_position(&mut self, room: RoomId, id: ItemId, pos: Position) -> bool {
        let Some(layout) = self.layout_mut(room) else {
            return false;
        };
        let Some(item) = layout.furniture_mut(id) else {
            log::warn!("store: unknown furniture {id}");
            return false;
        };
        if item.locked {
            log::warn!("store: furniture {id} is locked, move rejected");
            return false;
        }
        if item.position == pos {
            return false;
        }
        item.position = pos;
        self.touch(room);
        true
    }

    /// Apply a batch of moves atomically. Every furniture target must exist
    /// and no target may be locked; otherwise nothing is applied.
    pub fn move_multiple(&mut self, room: RoomId, moves: &[(ItemRef, Position)]) -> bool {
        let Some(layout) = self.layout_mut(room) else {
            return false;
        };
        let rejected = moves.iter().find(|(item, _)| {
            (item.kind == ItemKind::Furniture && layout.furniture(item.id).is_none())
                || layout.is_locked(*item)
        });
        if let Some((item, _)) = rejected {
            log::warn!("store: batch move rejected by {:?}", item.id);
            return false;
        }

        let mut changed = false;
        for (item, pos) in moves {
            if layout.position_of(*item) == Some(*pos) {
                continue;
            }
            match item.kind {
                ItemKind::Workstation => {
                    layout.workstation_positions.insert(item.id, *pos);
                }
                ItemKind::Furniture => {
                    layout.set_position(*item, *pos);
                }
            }
            changed = true;
        }
        if changed {
            log::debug!("store: moved {} items in {room}", moves.len());
            self.touch(room);
        }
        changed
    }

    // ─── Furniture ───────────────────────────────────────────────────────

    pub fn add_furniture(&mut self, room: RoomId, item: Furniture) -> bool {
        let Some(layout) = self.layout_mut(room) else {
            return false;
        };
        if layout.is_id_taken(item.id) {
            log::warn!("store: id {} already used in {room}", item.id);
            return false;
        }
        log::debug!("store: add {} to {room}", item.id);
        layout.furniture.push(item);
        self.touch(room);
        true
    }

    /// Remove a furniture item; groups left without members are deleted.
    pub fn remove_furniture(&mut self, room: RoomId, id: ItemId) -> bool {
        let Some(layout) = self.layout_mut(room) else {
            return false;
        };
        let before = layout.furniture.len();
        layout.furniture.retain(|f| f.id != id);
        if layout.furniture.len() == before {
            return false;
        }
        let pruned = layout.prune_empty_groups();
        log::debug!("store: removed {id} from {room} ({pruned} groups pruned)");
        self.touch(room);
        true
    }

    pub fn rename_furniture(&mut self, room: RoomId, id: ItemId, label: &str) -> bool {
        let Some(item) = self.layout_mut(room).and_then(|l| l.furniture_mut(id)) else {
            return false;
        };
        if item.label == label {
            return false;
        }
        item.label = label.to_string();
        self.touch(room);
        true
    }

    /// Copy furniture items, displaced by `offset` and kept inside the
    /// canvas. Copies are unlocked and ungrouped. Unknown ids are skipped.
    pub fn duplicate_furniture(&mut self, room: RoomId, ids: &[ItemId], offset: Position) -> Vec<ItemRef> {
        let bounds = self.bounds;
        let Some(layout) = self.layout_mut(room) else {
            return Vec::new();
        };

        let mut created = Vec::new();
        for id in ids {
            let Some(source) = layout.furniture(*id) else {
                continue;
            };
            let prefix = format!("{room}-{}", source.kind.as_str());
            let new_id = ItemId::next_free(&prefix, |c| layout.is_id_taken(c));
            let copy = Furniture {
                id: new_id,
                position: source
                    .position
                    .offset(offset.x, offset.y)
                    .clamp_within(source.size, bounds),
                locked: false,
                group: None,
                ..source.clone()
            };
            created.push(copy.item_ref());
            layout.furniture.push(copy);
        }

        if !created.is_empty() {
            log::debug!("store: duplicated {} items in {room}", created.len());
            self.touch(room);
        }
        created
    }

    // ─── Locks ───────────────────────────────────────────────────────────

    /// Flip an item's lock. Returns the new state, or `None` for unknown items.
    pub fn toggle_lock(&mut self, room: RoomId, item: ItemRef) -> Option<bool> {
        let layout = self.layout_mut(room)?;
        if !layout.contains(item) {
            return None;
        }
        let locked = !layout.is_locked(item);
        layout.set_locked(item, locked);
        self.touch(room);
        Some(locked)
    }

    /// Set the lock flag on every item. Returns how many flags changed.
    pub fn set_locked(&mut self, room: RoomId, items: &[ItemRef], locked: bool) -> usize {
        let Some(layout) = self.layout_mut(room) else {
            return 0;
        };
        let changed = items
            .iter()
            .filter(|item| layout.set_locked(**item, locked))
            .count();
        if changed > 0 {
            self.touch(room);
        }
        changed
    }

    // ─── Groups ──────────────────────────────────────────────────────────

    /// Put every known item of `items` into a new group.
    ///
    /// Needs at least two known items. The color cycles through the palette
    /// by the room's group count. Groups emptied by the reassignment are
    /// deleted.
    pub fn assign_group(&mut self, room: RoomId, items: &[ItemRef]) -> Option<GroupId> {
        let layout = self.layout_mut(room)?;
        let members: Vec<ItemRef> = items
            .iter()
            .copied()
            .filter(|item| layout.contains(*item))
            .collect();
        if members.len() < 2 {
            return None;
        }

        let count = layout.groups.len();
        let id = GroupId::next_free(&format!("{room}-group"), |c| layout.group(c).is_some());
        layout.groups.push(Group {
            id,
            label: format!("Group {}", count + 1),
            color: group_color(count).to_string(),
        });
        for item in &members {
            layout.set_group(*item, Some(id));
        }
        layout.prune_empty_groups();
        log::debug!("store: grouped {} items in {room} as {id}", members.len());
        self.touch(room);
        Some(id)
    }

    /// Remove group membership from every item. Groups left with no members
    /// are deleted; a group keeping a single member survives.
    pub fn clear_groups(&mut self, room: RoomId, items: &[ItemRef]) -> usize {
        let Some(layout) = self.layout_mut(room) else {
            return 0;
        };
        let changed = items
            .iter()
            .filter(|item| layout.set_group(**item, None))
            .count();
        if changed == 0 {
            return 0;
        }
        let pruned = layout.prune_empty_groups();
        log::debug!("store: ungrouped {changed} items in {room} ({pruned} groups deleted)");
        self.touch(room);
        changed
    }
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new(lf_core::config::EngineConfig::default().canvas)
    }
}
