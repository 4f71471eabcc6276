//! Per-room undo/redo over full layout snapshots.
//!
//! Each room keeps a linear list of snapshots and a cursor. Pushing a new
//! snapshot discards everything after the cursor (no branching redo), and
//! the oldest snapshots are evicted once the configured depth is exceeded.
//!
//! Snapshots are taken *before* each committing mutation, so the newest
//! entry is normally the state just before the live one. The first undo from
//! that position records the live layout as an extra entry, which is what
//! makes the undone change redoable.

use crate::store::LayoutStore;
use lf_core::id::RoomId;
use lf_core::model::RoomLayout;
use std::collections::{HashMap, VecDeque};

/// Snapshot list and cursor for one room.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    entries: VecDeque<RoomLayout>,
    /// `None` while the stack is empty.
    index: Option<usize>,
}

impl HistoryStack {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn entries(&self) -> impl Iterator<Item = &RoomLayout> {
        self.entries.iter()
    }

    fn at_newest(&self) -> bool {
        self.index.is_some_and(|i| i + 1 == self.entries.len())
    }

    fn push(&mut self, snapshot: RoomLayout, depth: usize) {
        if let Some(i) = self.index {
            self.entries.truncate(i + 1);
            if self.entries.get(i) == Some(&snapshot) {
                return;
            }
        } else {
            self.entries.clear();
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > depth {
            self.entries.pop_front();
        }
        self.index = Some(self.entries.len() - 1);
    }

    /// Record `live` at the tip when it has moved past the newest snapshot.
    fn capture_tip(&mut self, live: Option<&RoomLayout>, depth: usize) {
        let Some(live) = live else {
            return;
        };
        if self.at_newest() && self.entries.back() != Some(live) {
            self.push(live.clone(), depth);
        }
    }

    fn has_uncaptured_tip(&self, live: Option<&RoomLayout>) -> bool {
        self.at_newest() && live.is_some_and(|l| self.entries.back() != Some(l))
    }
}

/// Undo/redo stacks for every room.
pub struct History {
    stacks: HashMap<RoomId, HistoryStack>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            stacks: HashMap::new(),
            depth: depth.max(1),
        }
    }

    /// Snapshot `layout` as the room's state before a mutation.
    pub fn push(&mut self, room: RoomId, layout: RoomLayout) {
        let stack = self.stacks.entry(room).or_default();
        stack.push(layout, self.depth);
        log::debug!(
            "history: push {room} (depth {}, index {:?})",
            stack.len(),
            stack.index
        );
    }

    /// Step back one snapshot and restore it into `store`.
    pub fn undo(&mut self, room: RoomId, store: &mut LayoutStore) -> bool {
        let Some(stack) = self.stacks.get_mut(&room) else {
            return false;
        };
        stack.capture_tip(store.layout(room), self.depth);

        let Some(index) = stack.index.filter(|i| *i > 0) else {
            return false;
        };
        let target = index - 1;
        stack.index = Some(target);
        store.replace_layout(room, stack.entries[target].clone());
        log::debug!("history: undo {room} -> {target}");
        true
    }

    /// Step forward one snapshot and restore it into `store`.
    pub fn redo(&mut self, room: RoomId, store: &mut LayoutStore) -> bool {
        let Some(stack) = self.stacks.get_mut(&room) else {
            return false;
        };
        let Some(index) = stack.index.filter(|i| i + 1 < stack.entries.len()) else {
            return false;
        };
        let target = index + 1;
        stack.index = Some(target);
        store.replace_layout(room, stack.entries[target].clone());
        log::debug!("history: redo {room} -> {target}");
        true
    }

    /// Whether [`undo`](Self::undo) would change anything, given the room's
    /// live layout.
    pub fn can_undo(&self, room: RoomId, live: Option<&RoomLayout>) -> bool {
        self.stacks.get(&room).is_some_and(|s| {
            s.index.is_some_and(|i| i > 0) || s.has_uncaptured_tip(live)
        })
    }

    pub fn can_redo(&self, room: RoomId) -> bool {
        self.stacks
            .get(&room)
            .is_some_and(|s| s.index.is_some_and(|i| i + 1 < s.len()))
    }

    /// Number of snapshots held for `room`.
    pub fn depth(&self, room: RoomId) -> usize {
        self.stacks.get(&room).map_or(0, HistoryStack::len)
    }

    pub fn stack(&self, room: RoomId) -> Option<&HistoryStack> {
        self.stacks.get(&room)
    }

    pub fn clear(&mut self, room: RoomId) {
        if self.stacks.remove(&room).is_some() {
            log::debug!("history: cleared {room}");
        }
    }

    pub fn max_depth(&self) -> usize {
        self.depth
    }
}
