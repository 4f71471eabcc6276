//! Editor facade: the application-root owner of all layout-engine state.
//!
//! Every committing operation follows the same contract: snapshot the room's
//! current layout, apply the raw store mutation, and record the snapshot in
//! history only if the mutation changed something. A room without a stored
//! layout is initialized from its template first; if the mutation then turns
//! out to be a no-op, the fresh layout is dropped again.
//!
//! Pointer and keyboard input are honored only in edit mode.

use crate::drag::{DragCommit, DragController, DragSession, Follower};
use crate::events::{EditorEvent, Observers, SubscriptionId};
use crate::history::History;
use crate::input::{InputEvent, Modifiers};
use crate::selection::Selection;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::{LayoutStore, PendingWrite};
use lf_core::config::EngineConfig;
use lf_core::error::Result;
use lf_core::id::{GroupId, ItemId, RoomId};
use lf_core::model::*;
use lf_core::persist::{LayoutDocument, LayoutRepository};
use lf_core::snap::{GridMode, PlacedItem, compute_snap};
use lf_core::template::{default_layout, merge_with_defaults};
use std::collections::HashMap;

/// Whether a key event was handled. `Consumed` means the embedder must
/// suppress the platform's default action (e.g. native undo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Ignored,
}

pub struct Editor {
    config: EngineConfig,
    inventory: HashMap<RoomId, Vec<Workstation>>,
    store: LayoutStore,
    history: History,
    selection: Selection,
    drag: DragController,
    edit_mode: bool,
    grid_mode: GridMode,
    active_room: Option<RoomId>,
    observers: Observers,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Editor {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: LayoutStore::new(config.canvas),
            history: History::new(config.history_depth),
            config,
            inventory: HashMap::new(),
            selection: Selection::new(),
            drag: DragController::new(),
            edit_mode: false,
            grid_mode: GridMode::default(),
            active_room: None,
            observers: Observers::new(),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn grid_mode(&self) -> GridMode {
        self.grid_mode
    }

    pub fn active_room(&self) -> Option<RoomId> {
        self.active_room
    }

    /// The room's workstations in inventory order.
    pub fn inventory(&self, room: RoomId) -> &[Workstation] {
        self.inventory.get(&room).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Furniture always qualifies; workstations only while in the inventory.
    fn in_inventory(&self, room: RoomId, item: ItemRef) -> bool {
        item.kind == ItemKind::Furniture || self.inventory(room).iter().any(|ws| ws.id == item.id)
    }

    /// Items of `room` as the snap resolver and select-all see them.
    fn placed_items(&self, room: RoomId, layout: &RoomLayout) -> Vec<PlacedItem> {
        layout.placed_items(self.inventory(room), self.config.workstation_size)
    }

    /// Deterministic default layout of `room`.
    pub fn template(&self, room: RoomId) -> RoomLayout {
        default_layout(self.inventory(room), room, &self.config)
    }

    /// The layout to display: the stored one overlaid on the template.
    pub fn resolved_layout(&self, room: RoomId) -> RoomLayout {
        merge_with_defaults(self.store.layout(room), self.template(room))
    }

    /// Current position of any item, for rendering.
    pub fn position_of(&self, room: RoomId, item: ItemRef) -> Option<Position> {
        self.resolved_layout(room).position_of(item)
    }

    pub fn can_undo(&self, room: RoomId) -> bool {
        self.history.can_undo(room, self.store.layout(room))
    }

    pub fn can_redo(&self, room: RoomId) -> bool {
        self.history.can_redo(room)
    }

    // ─── Observers ───────────────────────────────────────────────────────

    pub fn subscribe(&mut self, handler: Box<dyn FnMut(&EditorEvent)>) -> SubscriptionId {
        self.observers.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit(&mut self, event: EditorEvent) {
        self.observers.emit(event);
    }

    // ─── Modes & context ─────────────────────────────────────────────────

    /// Replace the inventory of `room`.
    pub fn set_inventory(&mut self, room: RoomId, workstations: Vec<Workstation>) {
        self.inventory.insert(room, workstations);
        self.emit(EditorEvent::LayoutChanged(room));
    }

    /// Leaving edit mode drops the selection and any active drag.
    pub fn set_edit_mode(&mut self, on: bool) {
        if self.edit_mode == on {
            return;
        }
        self.edit_mode = on;
        log::debug!("editor: edit mode {}", if on { "on" } else { "off" });
        if !on {
            self.cancel_drag();
            self.clear_selection();
        }
        self.emit(EditorEvent::EditModeChanged(on));
    }

    /// Navigate to another room; the selection does not carry over.
    pub fn switch_room(&mut self, room: RoomId) {
        if self.active_room == Some(room) {
            return;
        }
        self.active_room = Some(room);
        self.cancel_drag();
        self.clear_selection();
    }

    pub fn set_grid_mode(&mut self, mode: GridMode) {
        if self.grid_mode != mode {
            self.grid_mode = mode;
            self.emit(EditorEvent::GridModeChanged(mode));
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn set_selection(&mut self, refs: impl IntoIterator<Item = ItemRef>) -> bool {
        let changed = self.selection.set(refs);
        if changed {
            self.emit(EditorEvent::SelectionChanged);
        }
        changed
    }

    pub fn toggle_selection(&mut self, item: ItemRef) -> bool {
        let selected = self.selection.toggle(item);
        self.emit(EditorEvent::SelectionChanged);
        selected
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.emit(EditorEvent::SelectionChanged);
        }
        changed
    }

    /// Select every workstation and furniture item of `room`.
    pub fn select_all(&mut self, room: RoomId) -> bool {
        let layout = self.resolved_layout(room);
        let all: Vec<ItemRef> = self
            .placed_items(room, &layout)
            .into_iter()
            .map(|p| p.item)
            .collect();
        self.set_selection(all)
    }

    /// Forget selected items that no longer exist in `room`.
    fn prune_selection(&mut self, room: RoomId) {
        let layout = self.resolved_layout(room);
        if self.selection.retain(|item| layout.contains(*item)) {
            self.emit(EditorEvent::SelectionChanged);
        }
    }

    // ─── Committing mutations ────────────────────────────────────────────

    fn commit(&mut self, room: RoomId, apply: impl FnOnce(&mut LayoutStore) -> bool) -> bool {
        let before = self.resolved_layout(room);
        let created = !self.store.has_layout(room);
        if created {
            self.store.init_layout(
                room,
                before.workstation_positions.clone(),
                before.furniture.clone(),
            );
        }
        if !apply(&mut self.store) {
            if created {
                self.store.reset_layout(room);
            }
            return false;
        }
        self.history.push(room, before);
        self.emit(EditorEvent::LayoutChanged(room));
        true
    }

    /// Move an inventory workstation. Ids outside the inventory are refused.
    pub fn update_workstation_position(&mut self, room: RoomId, id: ItemId, pos: Position) -> bool {
        if !self.in_inventory(room, ItemRef::new(id, ItemKind::Workstation)) {
            log::warn!("editor: {id:?} is not in the inventory of {room}");
            return false;
        }
        self.commit(room, |s| s.update_workstation_position(room, id, pos))
    }

    pub fn update_furniture_position(&mut self, room: RoomId, id: ItemId, pos: Position) -> bool {
        self.commit(room, |s| s.update_furniture_position(room, id, pos))
    }

    /// Apply a batch of moves as one undo step; nothing applies if any
    /// target is missing, locked, or a workstation outside the inventory.
    pub fn move_multiple(&mut self, room: RoomId, moves: &[(ItemRef, Position)]) -> bool {
        if let Some((item, _)) = moves.iter().find(|(item, _)| !self.in_inventory(room, *item)) {
            log::warn!("editor: {:?} is not in the inventory of {room}", item.id);
            return false;
        }
        self.commit(room, |s| s.move_multiple(room, moves))
    }

    pub fn add_furniture(&mut self, room: RoomId, item: Furniture) -> bool {
        self.commit(room, |s| s.add_furniture(room, item))
    }

    /// Add a catalog item of `kind` at the canvas center. Returns its id.
    pub fn add_furniture_of_kind(&mut self, room: RoomId, kind: FurnitureKind) -> Option<ItemId> {
        let canvas = self.config.canvas;
        let mut added = None;
        self.commit(room, |s| {
            let Some(layout) = s.layout(room) else {
                return false;
            };
            let prefix = format!("{room}-{}", kind.as_str());
            let id = ItemId::next_free(&prefix, |c| layout.is_id_taken(c));
            let ok = s.add_furniture(room, Furniture::from_catalog(id, kind, canvas));
            if ok {
                added = Some(id);
            }
            ok
        });
        added
    }

    pub fn remove_furniture(&mut self, room: RoomId, id: ItemId) -> bool {
        let removed = self.commit(room, |s| s.remove_furniture(room, id));
        if removed {
            self.prune_selection(room);
        }
        removed
    }

    /// Remove every selected furniture item. Workstations are skipped.
    pub fn remove_selected(&mut self, room: RoomId) -> usize {
        let ids = self.selection.furniture_ids();
        if ids.is_empty() {
            return 0;
        }
        let mut removed = 0;
        self.commit(room, |s| {
            for id in &ids {
                if s.remove_furniture(room, *id) {
                    removed += 1;
                }
            }
            removed > 0
        });
        if removed > 0 {
            self.prune_selection(room);
        }
        removed
    }

    pub fn rename_furniture(&mut self, room: RoomId, id: ItemId, label: &str) -> bool {
        self.commit(room, |s| s.rename_furniture(room, id, label))
    }

    /// Flip one item's lock. Returns the new state.
    pub fn toggle_lock(&mut self, room: RoomId, item: ItemRef) -> Option<bool> {
        let mut state = None;
        self.commit(room, |s| {
            state = s.toggle_lock(room, item);
            state.is_some()
        });
        state
    }

    pub fn lock_selection(&mut self, room: RoomId) -> usize {
        self.set_selection_locked(room, true)
    }

    pub fn unlock_selection(&mut self, room: RoomId) -> usize {
        self.set_selection_locked(room, false)
    }

    fn set_selection_locked(&mut self, room: RoomId, locked: bool) -> usize {
        let refs = self.selection.as_slice().to_vec();
        let mut changed = 0;
        self.commit(room, |s| {
            changed = s.set_locked(room, &refs, locked);
            changed > 0
        });
        changed
    }

    /// Group the selection. No-op below two selected items.
    pub fn group_selection(&mut self, room: RoomId) -> Option<GroupId> {
        let refs = self.selection.as_slice().to_vec();
        if refs.len() < 2 {
            return None;
        }
        let mut group = None;
        self.commit(room, |s| {
            group = s.assign_group(room, &refs);
            group.is_some()
        });
        group
    }

    pub fn ungroup_selection(&mut self, room: RoomId) -> usize {
        let refs = self.selection.as_slice().to_vec();
        let mut changed = 0;
        self.commit(room, |s| {
            changed = s.clear_groups(room, &refs);
            changed > 0
        });
        changed
    }

    /// Copy the selected furniture and select the copies. Workstations are
    /// fixed inventory and are never duplicated.
    pub fn duplicate_selection(&mut self, room: RoomId) -> Vec<ItemRef> {
        let ids = self.selection.furniture_ids();
        if ids.is_empty() {
            return Vec::new();
        }
        let offset = self.config.duplicate_offset;
        let mut created = Vec::new();
        self.commit(room, |s| {
            created = s.duplicate_furniture(room, &ids, offset);
            !created.is_empty()
        });
        if !created.is_empty() {
            self.set_selection(created.iter().copied());
        }
        created
    }

    /// Drop the room's stored layout, history, and selection; reads fall
    /// back to the template.
    pub fn reset_layout(&mut self, room: RoomId) -> bool {
        if self.drag.session().is_some_and(|s| s.room == room) {
            self.cancel_drag();
        }
        let removed = self.store.reset_layout(room);
        self.history.clear(room);
        self.clear_selection();
        if removed {
            self.emit(EditorEvent::LayoutChanged(room));
        }
        removed
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self, room: RoomId) -> bool {
        self.cancel_drag();
        if !self.history.undo(room, &mut self.store) {
            return false;
        }
        self.prune_selection(room);
        self.emit(EditorEvent::LayoutChanged(room));
        true
    }

    pub fn redo(&mut self, room: RoomId) -> bool {
        self.cancel_drag();
        if !self.history.redo(room, &mut self.store) {
            return false;
        }
        self.prune_selection(room);
        self.emit(EditorEvent::LayoutChanged(room));
        true
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Press on `item`. Plain clicks select the item (keeping an existing
    /// multi-selection that contains it) and start a drag; shift-clicks only
    /// toggle selection. Locked items are selectable but never dragged.
    pub fn pointer_down(
        &mut self,
        room: RoomId,
        item: ItemRef,
        pointer: Position,
        modifiers: Modifiers,
    ) -> bool {
        if !self.edit_mode {
            return false;
        }
        if !self.in_inventory(room, item) {
            log::warn!("editor: {:?} is not in the inventory of {room}", item.id);
            return false;
        }
        if modifiers.shift {
            self.toggle_selection(item);
            return false;
        }
        if !self.selection.contains(item) {
            self.set_selection([item]);
        }

        let layout = self.resolved_layout(room);
        let Some(origin) = layout.position_of(item) else {
            log::warn!("editor: pointer-down on unknown item {:?}", item.id);
            return false;
        };
        if layout.is_locked(item) {
            log::debug!("editor: {:?} is locked, drag refused", item.id);
            return false;
        }
        let followers = self.followers_of(room, &layout, item);
        self.drag
            .pointer_down(room, item, pointer, origin, followers, self.config.canvas)
    }

    /// Unlocked group mates of `item`.
    fn followers_of(&self, room: RoomId, layout: &RoomLayout, item: ItemRef) -> Vec<Follower> {
        let Some(group) = layout.group_of(item) else {
            return Vec::new();
        };
        let ws = self.config.workstation_size;
        layout
            .members_of(group)
            .into_iter()
            .filter(|m| *m != item && !layout.is_locked(*m))
            .filter(|m| self.in_inventory(room, *m))
            .filter_map(|m| {
                let rect = layout.rect_of(m, ws)?;
                Some(Follower {
                    item: m,
                    origin: rect.origin(),
                    size: rect.size(),
                })
            })
            .collect()
    }

    pub fn pointer_move(&mut self, pointer: Position) -> bool {
        let Some(session) = self.drag.session() else {
            return false;
        };
        let layout = self.resolved_layout(session.room);
        let followers: Vec<ItemRef> = session.followers.iter().map(|f| f.item).collect();
        let items: Vec<PlacedItem> = self
            .placed_items(session.room, &layout)
            .into_iter()
            .filter(|p| !followers.contains(&p.item))
            .collect();

        let grid = self.grid_mode;
        let config = &self.config;
        let updated = self.drag.pointer_move(pointer, |session, raw| {
            compute_snap(raw, session.target, grid, &items, config)
        });
        if updated {
            self.emit(EditorEvent::DragUpdated);
        }
        updated
    }

    /// Release the pointer: commit the drag as one undo step.
    pub fn pointer_up(&mut self) -> bool {
        let Some(commit) = self.drag.pointer_up() else {
            return false;
        };
        let committed = self.commit_drag(&commit);
        self.emit(EditorEvent::DragEnded { committed });
        committed
    }

    fn commit_drag(&mut self, drag: &DragCommit) -> bool {
        let room = drag.room;
        let target = drag.target;
        let position = drag.position;
        if !drag.followers.is_empty() {
            let moves = drag.moves();
            return self.commit(room, |s| s.move_multiple(room, &moves));
        }
        self.commit(room, |s| match target.kind {
            ItemKind::Workstation => s.update_workstation_position(room, target.id, position),
            ItemKind::Furniture => s.update_furniture_position(room, target.id, position),
        })
    }

    /// Abandon the active drag without committing.
    pub fn cancel_drag(&mut self) -> bool {
        let cancelled = self.drag.cancel();
        if cancelled {
            self.emit(EditorEvent::DragEnded { committed: false });
        }
        cancelled
    }

    // ─── Input routing ───────────────────────────────────────────────────

    /// Route one input event. `hit` is the item under the pointer for
    /// pointer-down events. Returns `true` if the event was handled.
    pub fn handle_input(&mut self, room: RoomId, event: &InputEvent, hit: Option<ItemRef>) -> bool {
        match (event, event.position()) {
            (InputEvent::PointerDown { modifiers, .. }, Some(pointer)) => match hit {
                Some(item) => self.pointer_down(room, item, pointer, *modifiers),
                None if self.edit_mode && !modifiers.shift => self.clear_selection(),
                None => false,
            },
            (InputEvent::PointerMove { .. }, Some(pointer)) => self.pointer_move(pointer),
            (InputEvent::PointerUp { .. }, _) => self.pointer_up(),
            (InputEvent::Key { key, modifiers }, _) => {
                let outcome = self.handle_key(
                    room,
                    key,
                    modifiers.ctrl,
                    modifiers.shift,
                    modifiers.alt,
                    modifiers.meta,
                );
                outcome == KeyOutcome::Consumed
            }
            _ => false,
        }
    }

    /// Run the shortcut bound to a key combo. Inactive outside edit mode.
    pub fn handle_key(
        &mut self,
        room: RoomId,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> KeyOutcome {
        if !self.edit_mode {
            return KeyOutcome::Ignored;
        }
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return KeyOutcome::Ignored;
        };
        log::debug!("editor: shortcut {action:?} in {room}");
        match action {
            ShortcutAction::Undo => {
                self.undo(room);
            }
            ShortcutAction::Redo => {
                self.redo(room);
            }
            ShortcutAction::SelectAll => {
                self.select_all(room);
            }
            ShortcutAction::Cancel => {
                if !self.cancel_drag() {
                    self.clear_selection();
                }
            }
            ShortcutAction::Duplicate => {
                self.duplicate_selection(room);
            }
            ShortcutAction::Delete => {
                self.remove_selected(room);
            }
            ShortcutAction::Group => {
                self.group_selection(room);
            }
            ShortcutAction::Ungroup => {
                self.ungroup_selection(room);
            }
            ShortcutAction::Lock => {
                self.lock_selection(room);
            }
            ShortcutAction::Unlock => {
                self.unlock_selection(room);
            }
        }
        KeyOutcome::Consumed
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Replace all stored layouts with the repository's. History of every
    /// loaded room is cleared. Returns the number of rooms loaded.
    pub fn load_from(&mut self, repo: &dyn LayoutRepository) -> Result<usize> {
        let document = repo.load_all()?;
        let rooms: Vec<RoomId> = document.keys().copied().collect();
        self.store.load(document);
        for room in &rooms {
            self.history.clear(*room);
            self.emit(EditorEvent::LayoutChanged(*room));
        }
        log::debug!("editor: loaded {} room layouts", rooms.len());
        Ok(rooms.len())
    }

    /// Write every layout changed since the last flush. On failure the
    /// unwritten rooms stay queued. Returns the number of writes.
    pub fn flush(&mut self, repo: &mut dyn LayoutRepository) -> Result<usize> {
        let mut writes = self.store.take_dirty().into_iter();
        let mut flushed = 0;
        while let Some(write) = writes.next() {
            let result = match &write {
                PendingWrite::Save(room, layout) => repo.save(*room, layout),
                PendingWrite::Delete(room) => repo.delete(*room),
            };
            if let Err(err) = result {
                log::warn!("editor: writing {} failed: {err}", write.room());
                self.store.mark_dirty(write.room());
                for rest in writes.by_ref() {
                    self.store.mark_dirty(rest.room());
                }
                return Err(err);
            }
            flushed += 1;
        }
        Ok(flushed)
    }

    /// Stored layouts keyed by room, for embedders that persist in bulk.
    pub fn snapshot_document(&self) -> LayoutDocument {
        self.store
            .rooms()
            .into_iter()
            .filter_map(|room| self.store.layout(room).map(|l| (room, l.clone())))
            .collect()
    }
}
