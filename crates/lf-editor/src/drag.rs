//! Drag session controller.
//!
//! `Idle → Dragging → Idle`. A session exists only between pointer-down and
//! pointer-up (or an explicit cancel). It holds the transient position of
//! the dragged item; committed positions live in the
//! [`LayoutStore`](crate::store::LayoutStore) and the session is never read
//! as a source of truth after it ends.
//!
//! Dragging a grouped item carries its unlocked group mates along: they are
//! recorded as followers and move by the same delta as the target.

use lf_core::id::RoomId;
use lf_core::model::{ItemRef, Position, Size};
use lf_core::snap::{DistanceLabels, Guides, SnapResult};

/// A group mate moved along with the drag target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Follower {
    pub item: ItemRef,
    pub origin: Position,
    pub size: Size,
}

/// In-flight drag of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub room: RoomId,
    pub target: ItemRef,
    /// Pointer position relative to the item's top-left corner at grab time.
    pub grab: Position,
    /// Committed position when the drag started.
    pub origin: Position,
    /// Live snapped position.
    pub position: Position,
    pub guides: Guides,
    pub distances: DistanceLabels,
    pub followers: Vec<Follower>,
    bounds: Size,
}

impl DragSession {
    /// Unsnapped top-left the pointer is asking for.
    pub fn raw_position(&self, pointer: Position) -> Position {
        Position::new(
            pointer.x.saturating_sub(self.grab.x),
            pointer.y.saturating_sub(self.grab.y),
        )
    }

    /// Displacement from the origin.
    pub fn delta(&self) -> (i32, i32) {
        (
            self.position.x - self.origin.x,
            self.position.y - self.origin.y,
        )
    }

    pub fn moved(&self) -> bool {
        self.position != self.origin
    }

    /// Live follower positions, each kept inside the canvas.
    pub fn follower_positions(&self) -> Vec<(ItemRef, Position)> {
        let (dx, dy) = self.delta();
        self.followers
            .iter()
            .map(|f| (f.item, f.origin.offset(dx, dy).clamp_within(f.size, self.bounds)))
            .collect()
    }
}

/// Result of a finished drag, handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragCommit {
    pub room: RoomId,
    pub target: ItemRef,
    pub origin: Position,
    pub position: Position,
    pub followers: Vec<(ItemRef, Position)>,
}

impl DragCommit {
    /// Every move of the commit, target first.
    pub fn moves(&self) -> Vec<(ItemRef, Position)> {
        std::iter::once((self.target, self.position))
            .chain(self.followers.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Pointer state machine for moving items.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Start dragging `target`, currently committed at `origin`.
    ///
    /// Returns `false` if a session is already active; the existing session
    /// is left untouched.
    pub fn pointer_down(
        &mut self,
        room: RoomId,
        target: ItemRef,
        pointer: Position,
        origin: Position,
        followers: Vec<Follower>,
        bounds: Size,
    ) -> bool {
        if self.is_dragging() {
            log::warn!("drag: pointer-down while a drag is active, ignored");
            return false;
        }
        log::trace!(
            "drag: start {:?} at ({}, {}) with {} followers",
            target.id,
            origin.x,
            origin.y,
            followers.len()
        );
        self.state = DragState::Dragging(DragSession {
            room,
            target,
            grab: Position::new(
                pointer.x.saturating_sub(origin.x),
                pointer.y.saturating_sub(origin.y),
            ),
            origin,
            position: origin,
            guides: Guides::new(),
            distances: DistanceLabels::new(),
            followers,
            bounds,
        });
        true
    }

    /// Feed a pointer position through `snap`. Returns `true` if the live
    /// position, guides, or distances changed.
    pub fn pointer_move(
        &mut self,
        pointer: Position,
        snap: impl FnOnce(&DragSession, Position) -> SnapResult,
    ) -> bool {
        let DragState::Dragging(session) = &mut self.state else {
            return false;
        };
        let raw = session.raw_position(pointer);
        let result = snap(&*session, raw);
        if result.position == session.position
            && result.guides == session.guides
            && result.distances == session.distances
        {
            return false;
        }
        session.position = result.position;
        session.guides = result.guides;
        session.distances = result.distances;
        log::trace!(
            "drag: {:?} -> ({}, {})",
            session.target.id,
            session.position.x,
            session.position.y
        );
        true
    }

    /// End the session and return what to commit. The session is discarded
    /// whether or not the item moved.
    pub fn pointer_up(&mut self) -> Option<DragCommit> {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        let followers = session.follower_positions();
        Some(DragCommit {
            room: session.room,
            target: session.target,
            origin: session.origin,
            position: session.position,
            followers,
        })
    }

    /// Abandon the session without committing. Returns `true` if one was
    /// active.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        if was_dragging {
            log::debug!("drag: cancelled");
        }
        self.state = DragState::Idle;
        was_dragging
    }
}
