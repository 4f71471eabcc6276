//! Change notifications for the render layer and persistence collaborators.
//!
//! Handlers run synchronously, in subscription order, on the thread that
//! processed the input.

use lf_core::id::RoomId;
use lf_core::snap::GridMode;
use std::fmt;

/// Something observable changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// A room's committed layout changed (mutation, undo, redo, reset).
    LayoutChanged(RoomId),
    SelectionChanged,
    /// The live drag position, guides, or distances changed.
    DragUpdated,
    /// The drag session ended; `committed` is false for cancels and
    /// zero-distance drags.
    DragEnded { committed: bool },
    EditModeChanged(bool),
    GridModeChanged(GridMode),
}

/// Handle for removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type Handler = Box<dyn FnMut(&EditorEvent)>;

/// Registered event handlers.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Box<dyn FnMut(&EditorEvent)>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.handlers.push((id, handler));
        log::trace!("events: subscribed {id}");
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _)| *sub != id);
        before != self.handlers.len()
    }

    pub fn emit(&mut self, event: EditorEvent) {
        for (_, handler) in &mut self.handlers {
            handler(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
