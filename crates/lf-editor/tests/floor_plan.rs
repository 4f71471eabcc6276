//! Integration tests: editing a room end to end through the editor facade.
//!
//! Covers drag sessions (snapping, groups, locks, cancel), selection
//! operations, and persistence through a repository.

use lf_core::config::EngineConfig;
use lf_core::error::{LayoutError, Result};
use lf_core::id::{ItemId, RoomId};
use lf_core::model::*;
use lf_core::persist::{LayoutDocument, LayoutRepository, MemoryRepository};
use lf_editor::{Editor, EditorEvent, InputEvent, KeyOutcome, Modifiers};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Editor in edit mode with `pcs` workstations in `room`. Unknown rooms get
/// six template columns: pc-1 (30, 60), pc-2 (82, 60), pc-3 (134, 60).
fn editor_for(room: &str, pcs: u32) -> (Editor, RoomId) {
    init_logger();
    let room = RoomId::intern(room);
    let mut editor = Editor::new(EngineConfig::default());
    editor.set_inventory(room, inventory(room, pcs));
    editor.set_edit_mode(true);
    (editor, room)
}

fn inventory(room: RoomId, pcs: u32) -> Vec<Workstation> {
    (1..=pcs)
        .map(|i| Workstation::new(format!("{room}-pc-{i}").as_str(), i))
        .collect()
}

fn pc(room: RoomId, n: u32) -> ItemRef {
    ItemRef::workstation(format!("{room}-pc-{n}").as_str())
}

fn fixture(room: RoomId, suffix: &str) -> ItemRef {
    ItemRef::furniture(format!("{room}-{suffix}").as_str())
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[test]
fn drag_snaps_to_workstation_grid_and_commits() {
    let (mut editor, room) = editor_for("fp-drag", 3);
    let target = pc(room, 3);

    assert!(editor.pointer_down(room, target, Position::new(140, 70), Modifiers::NONE));
    // Raw top-left (238, 152) rounds to the 52x46 cell at (260, 138).
    assert!(editor.pointer_move(Position::new(244, 162)));
    assert_eq!(
        editor.drag_session().map(|s| s.position),
        Some(Position::new(260, 138))
    );
    // Nothing committed while dragging.
    assert!(editor.store().layout(room).is_none());

    assert!(editor.pointer_up());
    assert!(editor.drag_session().is_none());
    assert_eq!(editor.position_of(room, target), Some(Position::new(260, 138)));
    // First edit stores the whole template.
    let layout = editor.store().layout(room).unwrap();
    assert_eq!(layout.workstation_positions.len(), 3);
    assert_eq!(layout.furniture.len(), 5);
}

#[test]
fn grouped_items_move_together_as_one_step() {
    let (mut editor, room) = editor_for("fp-group-drag", 3);
    editor.set_selection([pc(room, 1), pc(room, 2)]);
    assert!(editor.group_selection(room).is_some());
    let depth = editor.history().depth(room);

    let hit = Some(pc(room, 1));
    assert!(editor.handle_input(
        room,
        &InputEvent::pointer_down(35.0, 65.0, Modifiers::NONE),
        hit
    ));
    // Raw (134, 106) snaps to (156, 92): delta (126, 32).
    assert!(editor.handle_input(room, &InputEvent::pointer_move(139.0, 111.0), None));
    assert!(editor.handle_input(room, &InputEvent::pointer_up(139.0, 111.0), None));

    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(156, 92)));
    assert_eq!(editor.position_of(room, pc(room, 2)), Some(Position::new(208, 92)));
    assert_eq!(editor.position_of(room, pc(room, 3)), Some(Position::new(134, 60)));
    assert_eq!(editor.history().depth(room), depth + 1);

    assert!(editor.undo(room));
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(30, 60)));
    assert_eq!(editor.position_of(room, pc(room, 2)), Some(Position::new(82, 60)));
}

#[test]
fn locked_group_mate_stays_behind() {
    let (mut editor, room) = editor_for("fp-group-lock", 2);
    editor.set_selection([pc(room, 1), pc(room, 2)]);
    editor.group_selection(room);
    assert_eq!(editor.toggle_lock(room, pc(room, 2)), Some(true));

    assert!(editor.pointer_down(room, pc(room, 1), Position::new(35, 65), Modifiers::NONE));
    assert!(editor.drag_session().unwrap().followers.is_empty());
    editor.pointer_move(Position::new(139, 111));
    assert!(editor.pointer_up());

    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(156, 92)));
    assert_eq!(editor.position_of(room, pc(room, 2)), Some(Position::new(82, 60)));
}

#[test]
fn locked_item_cannot_be_dragged_or_moved() {
    let (mut editor, room) = editor_for("fp-lock", 1);
    let target = pc(room, 1);
    assert_eq!(editor.toggle_lock(room, target), Some(true));

    assert!(!editor.pointer_down(room, target, Position::new(35, 65), Modifiers::NONE));
    assert!(editor.selection().contains(target), "locked items stay selectable");
    assert!(!editor.pointer_move(Position::new(300, 300)));
    assert!(!editor.pointer_up());
    assert!(!editor.update_workstation_position(room, target.id, Position::new(300, 300)));
    assert_eq!(editor.position_of(room, target), Some(Position::new(30, 60)));

    assert_eq!(editor.toggle_lock(room, target), Some(false));
    assert!(editor.update_workstation_position(room, target.id, Position::new(300, 300)));
}

#[test]
fn escape_cancels_drag_without_history() {
    let (mut editor, room) = editor_for("fp-cancel", 3);
    let target = pc(room, 3);
    editor.pointer_down(room, target, Position::new(140, 70), Modifiers::NONE);
    editor.pointer_move(Position::new(300, 200));
    assert!(editor.drag_session().is_some());

    assert_eq!(
        editor.handle_key(room, "Escape", false, false, false, false),
        KeyOutcome::Consumed
    );
    assert!(editor.drag_session().is_none());
    assert!(!editor.pointer_up());
    assert_eq!(editor.position_of(room, target), Some(Position::new(134, 60)));
    assert!(editor.store().layout(room).is_none());
    assert_eq!(editor.history().depth(room), 0);

    // A second Escape clears the selection.
    assert!(editor.selection().contains(target));
    editor.handle_key(room, "Escape", false, false, false, false);
    assert!(editor.selection().is_empty());
}

#[test]
fn click_without_movement_records_nothing() {
    let (mut editor, room) = editor_for("fp-click", 1);
    assert!(editor.pointer_down(room, pc(room, 1), Position::new(35, 65), Modifiers::NONE));
    assert!(!editor.pointer_up());
    assert!(editor.store().layout(room).is_none());
    assert!(!editor.can_undo(room));
}

#[test]
fn pointer_far_outside_canvas_clamps_to_edges() {
    let (mut editor, room) = editor_for("fp-far", 1);
    let target = pc(room, 1);
    assert!(editor.pointer_down(room, target, Position::new(40, 70), Modifiers::NONE));

    assert!(editor.pointer_move(Position::new(i32::MAX, 70)));
    assert_eq!(
        editor.drag_session().map(|s| s.position),
        Some(Position::new(820 - 44, 46))
    );

    // Canvas coordinates beyond the i32 range saturate on the way in.
    assert!(editor.handle_input(room, &InputEvent::pointer_move(-1.0e12, 70.0), None));
    assert_eq!(
        editor.drag_session().map(|s| s.position),
        Some(Position::new(0, 46))
    );

    assert!(editor.pointer_up());
    assert_eq!(editor.position_of(room, target), Some(Position::new(0, 46)));
}

#[test]
fn retired_workstation_does_not_guide_snapping() {
    let (mut editor, room) = editor_for("fp-retired", 3);
    assert!(editor.update_workstation_position(room, pc(room, 3).id, Position::new(400, 300)));
    editor.set_inventory(room, inventory(room, 2));

    let door = fixture(room, "door");
    assert!(editor.pointer_down(room, door, Position::new(770, 460), Modifiers::NONE));
    assert!(editor.pointer_move(Position::new(408, 310)));
    let session = editor.drag_session().unwrap();
    assert_eq!(session.position, Position::new(400, 300));
    assert!(session.guides.is_empty());
    editor.cancel_drag();

    editor.select_all(room);
    assert_eq!(editor.selection().len(), 2 + 5);
    assert!(!editor.pointer_down(room, pc(room, 3), Position::new(410, 310), Modifiers::NONE));
    assert!(!editor.selection().contains(pc(room, 3)));
    assert!(editor.drag_session().is_none());
}

#[test]
fn pointer_input_needs_edit_mode() {
    let (mut editor, room) = editor_for("fp-view", 1);
    editor.set_edit_mode(false);
    assert!(!editor.pointer_down(room, pc(room, 1), Position::new(35, 65), Modifiers::NONE));
    assert!(editor.drag_session().is_none());
    assert!(editor.selection().is_empty());
}

#[test]
fn leaving_edit_mode_cancels_drag() {
    let (mut editor, room) = editor_for("fp-mode-drag", 1);
    editor.pointer_down(room, pc(room, 1), Position::new(35, 65), Modifiers::NONE);
    editor.pointer_move(Position::new(200, 200));
    editor.set_edit_mode(false);
    assert!(editor.drag_session().is_none());
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(30, 60)));
}

#[test]
fn drag_events_are_emitted() {
    let (mut editor, room) = editor_for("fp-events", 1);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.subscribe(Box::new(move |e| sink.borrow_mut().push(*e)));

    editor.pointer_down(room, pc(room, 1), Position::new(35, 65), Modifiers::NONE);
    editor.pointer_move(Position::new(139, 111));
    editor.pointer_up();

    assert_eq!(
        *seen.borrow(),
        vec![
            EditorEvent::SelectionChanged,
            EditorEvent::DragUpdated,
            EditorEvent::LayoutChanged(room),
            EditorEvent::DragEnded { committed: true },
        ]
    );
}

// ─── Selection ───────────────────────────────────────────────────────────

#[test]
fn shift_click_toggles_without_dragging() {
    let (mut editor, room) = editor_for("fp-shift", 2);
    assert!(!editor.pointer_down(room, pc(room, 1), Position::new(35, 65), Modifiers::SHIFT));
    assert!(!editor.pointer_down(room, pc(room, 2), Position::new(90, 65), Modifiers::SHIFT));
    assert_eq!(editor.selection().as_slice(), &[pc(room, 1), pc(room, 2)]);
    assert!(editor.drag_session().is_none());

    editor.pointer_down(room, pc(room, 1), Position::new(35, 65), Modifiers::SHIFT);
    assert_eq!(editor.selection().as_slice(), &[pc(room, 2)]);
}

#[test]
fn clicking_empty_canvas_clears_selection() {
    let (mut editor, room) = editor_for("fp-empty-click", 1);
    editor.select_all(room);
    assert!(!editor.selection().is_empty());
    editor.handle_input(room, &InputEvent::pointer_down(600.0, 300.0, Modifiers::NONE), None);
    assert!(editor.selection().is_empty());
}

#[test]
fn ungrouping_members_one_at_a_time() {
    let (mut editor, room) = editor_for("fp-ungroup", 1);
    let table = fixture(room, "instr");
    editor.set_selection([pc(room, 1), table]);
    let group = editor.group_selection(room).unwrap();
    let layout = editor.resolved_layout(room);
    assert_eq!(layout.group_of(pc(room, 1)), Some(group));
    assert_eq!(layout.group_of(table), Some(group));
    assert_eq!(layout.group(group).unwrap().label, "Group 1");

    editor.set_selection([pc(room, 1)]);
    assert_eq!(editor.ungroup_selection(room), 1);
    let layout = editor.resolved_layout(room);
    assert!(layout.group(group).is_some(), "one member left keeps the group");
    assert_eq!(layout.members_of(group), vec![table]);

    editor.set_selection([table]);
    assert_eq!(editor.ungroup_selection(room), 1);
    assert!(editor.resolved_layout(room).groups.is_empty());
}

#[test]
fn duplicate_copies_furniture_only() {
    let (mut editor, room) = editor_for("fp-dup", 2);
    editor.set_selection([pc(room, 1), fixture(room, "router")]);

    let copies = editor.duplicate_selection(room);
    assert_eq!(copies.len(), 1);
    let copy = copies[0];
    assert_eq!(copy.id, ItemId::intern("fp-dup-router-1"));
    assert_eq!(editor.selection().as_slice(), &[copy]);

    let layout = editor.resolved_layout(room);
    assert_eq!(layout.workstation_positions.len(), 2);
    assert_eq!(layout.furniture.len(), 6);
    let duplicated = layout.furniture(copy.id).unwrap();
    assert_eq!(duplicated.position, Position::new(30, 28));
    assert_eq!(duplicated.label, "Router");
    assert!(!duplicated.locked);
}

#[test]
fn delete_key_removes_selected_furniture() {
    let (mut editor, room) = editor_for("fp-delete", 1);
    let door = fixture(room, "door");
    editor.set_selection([pc(room, 1), door]);

    assert_eq!(
        editor.handle_key(room, "Delete", false, false, false, false),
        KeyOutcome::Consumed
    );
    let layout = editor.resolved_layout(room);
    assert!(!layout.contains(door));
    assert!(layout.contains(pc(room, 1)));
    assert_eq!(editor.selection().as_slice(), &[pc(room, 1)]);
}

#[test]
fn switching_rooms_drops_selection() {
    let (mut editor, room) = editor_for("fp-switch-a", 1);
    editor.switch_room(room);
    editor.select_all(room);
    editor.switch_room(RoomId::intern("fp-switch-b"));
    assert!(editor.selection().is_empty());
}

// ─── Persistence ─────────────────────────────────────────────────────────

#[test]
fn flush_then_load_restores_layouts() {
    let (mut editor, room) = editor_for("fp-persist", 2);
    editor.update_workstation_position(room, pc(room, 2).id, Position::new(400, 300));
    editor.toggle_lock(room, fixture(room, "door"));

    let mut repo = MemoryRepository::new();
    assert_eq!(editor.flush(&mut repo).unwrap(), 1);
    assert_eq!(editor.flush(&mut repo).unwrap(), 0, "nothing dirty after a flush");

    let mut reloaded = Editor::new(EngineConfig::default());
    reloaded.set_inventory(room, inventory(room, 2));
    assert_eq!(reloaded.load_from(&repo).unwrap(), 1);
    assert_eq!(reloaded.resolved_layout(room), editor.resolved_layout(room));
    assert!(!reloaded.can_undo(room));
}

#[test]
fn reset_deletes_stored_layout() {
    let (mut editor, room) = editor_for("fp-reset", 1);
    editor.update_workstation_position(room, pc(room, 1).id, Position::new(400, 300));
    let mut repo = MemoryRepository::new();
    editor.flush(&mut repo).unwrap();
    assert!(repo.contains(room));

    assert!(editor.reset_layout(room));
    assert!(!editor.can_undo(room));
    assert_eq!(editor.resolved_layout(room), editor.template(room));
    editor.flush(&mut repo).unwrap();
    assert!(!repo.contains(room));
}

/// Repository that fails every write while `offline` is set.
#[derive(Default)]
struct FlakyRepository {
    offline: bool,
    inner: MemoryRepository,
}

impl LayoutRepository for FlakyRepository {
    fn load_all(&self) -> Result<LayoutDocument> {
        self.inner.load_all()
    }

    fn save(&mut self, room: RoomId, layout: &RoomLayout) -> Result<()> {
        if self.offline {
            return Err(LayoutError::Repository("offline".to_string()));
        }
        self.inner.save(room, layout)
    }

    fn delete(&mut self, room: RoomId) -> Result<()> {
        self.inner.delete(room)
    }
}

#[test]
fn failed_flush_keeps_rooms_queued() {
    let (mut editor, a) = editor_for("fp-flaky-a", 1);
    let b = RoomId::intern("fp-flaky-b");
    editor.set_inventory(b, inventory(b, 1));
    editor.update_workstation_position(a, pc(a, 1).id, Position::new(200, 200));
    editor.update_workstation_position(b, pc(b, 1).id, Position::new(300, 300));

    let mut repo = FlakyRepository {
        offline: true,
        ..FlakyRepository::default()
    };
    assert!(matches!(
        editor.flush(&mut repo),
        Err(LayoutError::Repository(_))
    ));

    repo.offline = false;
    assert_eq!(editor.flush(&mut repo).unwrap(), 2);
    assert!(repo.inner.contains(a));
    assert!(repo.inner.contains(b));
}

#[test]
fn corrupt_blob_fails_load_and_keeps_state() {
    let (mut editor, room) = editor_for("fp-corrupt", 1);
    editor.update_workstation_position(room, pc(room, 1).id, Position::new(200, 200));

    let mut repo = MemoryRepository::new();
    repo.insert_raw(room, vec![0xc1, 0x00]);
    assert!(editor.load_from(&repo).is_err());
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(200, 200)));
}
