use std::collections::BTreeSet;

use crate::domain::entities::record::RecordId;

/// Selected record ids, independent of filter, sort and page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips `id` and returns whether it is now selected.
    pub fn toggle(&mut self, id: &RecordId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    pub fn select(&mut self, id: &RecordId) {
        self.selected.insert(id.clone());
    }

    pub fn deselect(&mut self, id: &RecordId) {
        self.selected.remove(id);
    }

    /// Selects every given id; ids outside the list keep their state.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RecordId>) {
        self.selected.extend(ids.into_iter().cloned());
    }

    pub fn deselect_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RecordId>) {
        for id in ids {
            self.selected.remove(id);
        }
    }

    /// True when the list is non-empty and every id in it is selected.
    pub fn all_selected<'a>(&self, ids: impl IntoIterator<Item = &'a RecordId>) -> bool {
        let mut any = false;
        for id in ids {
            if !self.selected.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Ids selected at this moment, in id order.
    pub fn snapshot(&self) -> Vec<RecordId> {
        self.selected.iter().cloned().collect()
    }
}
