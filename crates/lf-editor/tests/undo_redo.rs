//! Integration tests: per-room undo/redo through the editor facade.
//!
//! Every committing operation must be undoable in one step, and undo/redo
//! must restore layouts deep-equal to the states they were taken from.

use lf_core::config::EngineConfig;
use lf_core::id::{ItemId, RoomId};
use lf_core::model::*;
use lf_editor::{Editor, KeyOutcome, Modifiers};
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor_for(room: &str, pcs: u32) -> (Editor, RoomId) {
    init_logger();
    let room = RoomId::intern(room);
    let mut editor = Editor::new(EngineConfig::default());
    let list = (1..=pcs)
        .map(|i| Workstation::new(format!("{room}-pc-{i}").as_str(), i))
        .collect();
    editor.set_inventory(room, list);
    editor.set_edit_mode(true);
    (editor, room)
}

fn pc(room: RoomId, n: u32) -> ItemRef {
    ItemRef::workstation(format!("{room}-pc-{n}").as_str())
}

// ─── Round trips ────────────────────────────────────────────────────────

#[test]
fn undo_then_redo_restores_both_states() {
    let (mut editor, room) = editor_for("undo-roundtrip", 3);
    let table = ItemId::intern("undo-roundtrip-instr");

    // Start from an explicit layout so S0 is a stored state.
    assert!(editor.rename_furniture(room, table, "Lecturer"));
    let s0 = editor.store().layout(room).cloned().unwrap();

    assert!(editor.update_furniture_position(room, table, Position::new(200, 200)));
    let s1 = editor.store().layout(room).cloned().unwrap();
    assert_ne!(s0, s1);

    assert!(editor.undo(room));
    assert_eq!(editor.store().layout(room), Some(&s0));

    assert!(editor.redo(room));
    assert_eq!(editor.store().layout(room), Some(&s1));
    assert!(!editor.redo(room), "nothing newer than S1");
}

#[test]
fn undo_first_edit_returns_to_template_positions() {
    let (mut editor, room) = editor_for("undo-first", 2);
    let template = editor.template(room);
    assert!(editor.update_workstation_position(room, pc(room, 2).id, Position::new(300, 300)));

    assert!(editor.undo(room));
    assert_eq!(editor.resolved_layout(room), template);
    assert!(!editor.can_undo(room));
    assert!(editor.can_redo(room));
}

#[test]
fn new_edit_after_undo_discards_redo() {
    let (mut editor, room) = editor_for("undo-branch", 2);
    let id = pc(room, 1).id;
    editor.update_workstation_position(room, id, Position::new(104, 92));
    editor.update_workstation_position(room, id, Position::new(156, 92));
    editor.undo(room);
    assert!(editor.can_redo(room));

    editor.update_workstation_position(room, id, Position::new(208, 138));
    assert!(!editor.can_redo(room));
    assert!(editor.undo(room));
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(104, 92)));
}

#[test]
fn history_is_capped_at_configured_depth() {
    let (mut editor, room) = editor_for("undo-cap", 1);
    let id = pc(room, 1).id;
    for i in 0..45 {
        assert!(editor.update_workstation_position(room, id, Position::new(i * 2, 0)));
    }
    assert_eq!(editor.history().depth(room), 40);

    let mut steps = 0;
    while editor.undo(room) {
        steps += 1;
    }
    // Capturing the live tip on the first undo evicts one more snapshot.
    assert_eq!(steps, 39);
    assert_eq!(editor.history().depth(room), 40);
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(10, 0)));
}

#[test]
fn rooms_have_independent_history() {
    let (mut editor, a) = editor_for("undo-room-a", 1);
    let b = RoomId::intern("undo-room-b");
    editor.set_inventory(b, vec![Workstation::new("undo-room-b-pc-1", 1)]);

    editor.update_workstation_position(a, pc(a, 1).id, Position::new(300, 300));
    assert!(!editor.can_undo(b));
    assert!(!editor.undo(b));
    assert_eq!(editor.position_of(a, pc(a, 1)), Some(Position::new(300, 300)));
}

// ─── Operations are single steps ────────────────────────────────────────

#[test]
fn group_lock_and_duplicate_each_undo_in_one_step() {
    let (mut editor, room) = editor_for("undo-ops", 2);
    let router = ItemRef::furniture("undo-ops-router");
    editor.set_selection([pc(room, 1), router]);

    let group = editor.group_selection(room).unwrap();
    assert_eq!(editor.lock_selection(room), 2);
    let copies = editor.duplicate_selection(room);
    assert_eq!(copies.len(), 1);

    assert!(editor.undo(room));
    assert!(editor.resolved_layout(room).furniture(copies[0].id).is_none());
    assert!(editor.undo(room));
    assert!(!editor.resolved_layout(room).is_locked(router));
    assert!(editor.undo(room));
    assert!(editor.resolved_layout(room).group(group).is_none());
}

#[test]
fn noop_operations_leave_no_history() {
    let (mut editor, room) = editor_for("undo-noop", 2);
    editor.set_selection([pc(room, 1)]);
    assert_eq!(editor.group_selection(room), None);
    assert_eq!(editor.ungroup_selection(room), 0);
    assert!(editor.duplicate_selection(room).is_empty());
    assert_eq!(editor.unlock_selection(room), 0);
    assert_eq!(editor.history().depth(room), 0);
    assert!(editor.store().layout(room).is_none());
}

#[test]
fn keyboard_undo_redo() {
    let (mut editor, room) = editor_for("undo-keys", 1);
    let id = pc(room, 1).id;
    editor.update_workstation_position(room, id, Position::new(52, 46));

    assert_eq!(
        editor.handle_key(room, "z", true, false, false, false),
        KeyOutcome::Consumed
    );
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(30, 60)));

    assert_eq!(
        editor.handle_key(room, "y", true, false, false, false),
        KeyOutcome::Consumed
    );
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(52, 46)));

    editor.handle_key(room, "z", false, false, false, true);
    editor.handle_key(room, "Z", false, true, false, true);
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(52, 46)));
}

#[test]
fn undo_drops_selection_of_vanished_items() {
    let (mut editor, room) = editor_for("undo-select", 0);
    let added = editor.add_furniture_of_kind(room, FurnitureKind::Wifi).unwrap();
    editor.set_selection([ItemRef::furniture(added)]);
    editor.undo(room);
    assert!(editor.selection().is_empty());
}

#[test]
fn drag_commit_is_one_undo_step() {
    let (mut editor, room) = editor_for("undo-drag", 1);
    editor.pointer_down(room, pc(room, 1), Position::new(40, 70), Modifiers::NONE);
    editor.pointer_move(Position::new(100, 100));
    editor.pointer_move(Position::new(200, 150));
    editor.pointer_move(Position::new(250, 200));
    assert!(editor.pointer_up());
    assert_eq!(editor.history().depth(room), 1);

    assert!(editor.undo(room));
    assert_eq!(editor.position_of(room, pc(room, 1)), Some(Position::new(30, 60)));
}
