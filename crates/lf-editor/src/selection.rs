//! Multi-select set of item references.
//!
//! Unique by `(id, kind)`. Insertion order is kept only so iteration is
//! stable; it carries no meaning.

use lf_core::id::ItemId;
use lf_core::model::{ItemKind, ItemRef};
use smallvec::SmallVec;

/// Inline capacity: most selections are a click or a small group.
type Items = SmallVec<[ItemRef; 4]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Items,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. Duplicates in `refs` collapse to one entry.
    /// Returns `true` if the selection changed.
    pub fn set(&mut self, refs: impl IntoIterator<Item = ItemRef>) -> bool {
        let mut next = Items::new();
        for item in refs {
            if !next.contains(&item) {
                next.push(item);
            }
        }
        if next == self.items {
            return false;
        }
        self.items = next;
        true
    }

    /// Add `item` if absent, remove it if present. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&mut self, item: ItemRef) -> bool {
        if let Some(pos) = self.items.iter().position(|i| *i == item) {
            self.items.remove(pos);
            false
        } else {
            self.items.push(item);
            true
        }
    }

    /// Returns `true` if anything was selected.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.items.is_empty();
        self.items.clear();
        had_any
    }

    /// Drop entries rejected by `keep`. Returns `true` if any were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&ItemRef) -> bool) -> bool {
        let before = self.items.len();
        self.items.retain(|item| keep(item));
        before != self.items.len()
    }

    pub fn contains(&self, item: ItemRef) -> bool {
        self.items.contains(&item)
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemRef> + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[ItemRef] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn furniture_ids(&self) -> Vec<ItemId> {
        self.ids_of(ItemKind::Furniture)
    }

    pub fn workstation_ids(&self) -> Vec<ItemId> {
        self.ids_of(ItemKind::Workstation)
    }

    fn ids_of(&self, kind: ItemKind) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|i| i.kind == kind)
            .map(|i| i.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = Selection::new();
        let pc = ItemRef::workstation("sel-pc-1");
        assert!(sel.toggle(pc));
        assert!(sel.contains(pc));
        assert!(!sel.toggle(pc));
        assert!(sel.is_empty());
    }

    #[test]
    fn same_id_different_kind_are_distinct() {
        let mut sel = Selection::new();
        sel.toggle(ItemRef::workstation("sel-shared"));
        sel.toggle(ItemRef::furniture("sel-shared"));
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.furniture_ids(), vec![ItemId::intern("sel-shared")]);
        assert_eq!(sel.workstation_ids(), vec![ItemId::intern("sel-shared")]);
    }

    #[test]
    fn set_dedupes_and_reports_change() {
        let mut sel = Selection::new();
        let a = ItemRef::furniture("sel-a");
        assert!(sel.set([a, a]));
        assert_eq!(sel.len(), 1);
        assert!(!sel.set([a]), "same contents is not a change");
        assert!(sel.clear());
        assert!(!sel.clear());
    }
}
