use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::domain::entities::record::{Identified, RecordId};
use crate::domain::view::column::ColumnSet;
use crate::domain::view::selection::SelectionSet;
use crate::infra::export::csv::{export_records, ExportLayout};
use crate::usecase::ports::record_store::{RecordStore, StoreError};

/// Per-id result of a bulk action over a selection snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub requested: usize,
    pub succeeded: Vec<RecordId>,
    pub failed: Vec<RecordId>,
    /// Selected ids no longer present in the collection.
    pub skipped: Vec<RecordId>,
}

impl BulkReport {
    /// e.g. `"3 of 5 deleted"`.
    pub fn summary(&self, verb: &str) -> String {
        format!("{} of {} {verb}", self.succeeded.len(), self.requested)
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

pub struct BulkService<T> {
    store: Arc<dyn RecordStore<T>>,
}

impl<T: Identified> BulkService<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>) -> Self {
        Self { store }
    }

    /// Deletes the selected ids that still exist in `current`.
    ///
    /// Deleted and skipped ids leave the selection; failed ids stay selected
    /// so the user can retry them.
    pub fn delete_selected(
        &self,
        selection: &mut SelectionSet,
        current: &[T],
    ) -> Result<BulkReport, StoreError> {
        let requested = selection.snapshot();
        let present: HashSet<&RecordId> = current.iter().map(Identified::record_id).collect();
        let (targets, mut skipped): (Vec<RecordId>, Vec<RecordId>) =
            requested.iter().cloned().partition(|id| present.contains(id));

        let outcome = if targets.is_empty() {
            Default::default()
        } else {
            self.store.delete_records(&targets)?
        };
        skipped.extend(outcome.missing);

        selection.deselect_all(outcome.succeeded.iter().chain(&skipped));

        let report = BulkReport {
            requested: requested.len(),
            succeeded: outcome.succeeded,
            failed: outcome.failed,
            skipped,
        };
        info!(
            requested = report.requested,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "bulk delete finished"
        );
        Ok(report)
    }
}

/// Selected records that still exist, in the order of `ordered`.
pub fn selected_in_order<'a, T: Identified>(
    selection: &SelectionSet,
    ordered: &[&'a T],
) -> Vec<&'a T> {
    ordered
        .iter()
        .copied()
        .filter(|record| selection.is_selected(record.record_id()))
        .collect()
}

/// CSV bytes for the selected records, following the current sort.
pub fn export_selection<T: Identified>(
    selection: &SelectionSet,
    ordered: &[&T],
    layout: &ExportLayout,
    columns: &ColumnSet<T>,
) -> Result<Vec<u8>> {
    let records = selected_in_order(selection, ordered);
    info!(
        selected = selection.selected_count(),
        exported = records.len(),
        "exporting selection"
    );
    export_records(records, layout, columns)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::entities::category::Category;
    use crate::domain::entities::product::Product;
    use crate::usecase::ports::record_store::{BulkOutcome, FetchFilters};

    /// Deletes everything except ids listed in `refuse`.
    struct FakeStore {
        refuse: Vec<RecordId>,
        calls: Mutex<Vec<Vec<RecordId>>>,
    }

    impl FakeStore {
        fn new(refuse: &[&str]) -> Self {
            Self {
                refuse: refuse.iter().map(|id| RecordId::from(*id)).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl RecordStore<Product> for FakeStore {
        fn fetch_records(&self, _filters: &FetchFilters) -> Result<Vec<Product>, StoreError> {
            Ok(Vec::new())
        }

        fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
            Ok(Vec::new())
        }

        fn delete_records(&self, ids: &[RecordId]) -> Result<BulkOutcome, StoreError> {
            self.calls.lock().expect("lock").push(ids.to_vec());
            let (failed, succeeded) = ids.iter().cloned().partition(|id| self.refuse.contains(id));
            Ok(BulkOutcome {
                succeeded,
                failed,
                ..Default::default()
            })
        }
    }

    fn select(ids: &[&str]) -> SelectionSet {
        let mut selection = SelectionSet::new();
        for id in ids {
            selection.select(&RecordId::from(*id));
        }
        selection
    }

    #[test]
    fn partial_delete_reports_each_id() {
        let store = Arc::new(FakeStore::new(&["c"]));
        let service = BulkService::<Product>::new(store.clone());
        let current = vec![
            Product::new("a", "A"),
            Product::new("b", "B"),
            Product::new("c", "C"),
            Product::new("d", "D"),
        ];
        let mut selection = select(&["a", "b", "c", "d", "gone"]);

        let report = service
            .delete_selected(&mut selection, &current)
            .expect("delete should succeed");

        assert_eq!(report.summary("deleted"), "3 of 5 deleted");
        assert_eq!(report.failed, vec![RecordId::from("c")]);
        assert_eq!(report.skipped, vec![RecordId::from("gone")]);
        assert!(!report.is_complete());
        assert_eq!(selection.snapshot(), vec![RecordId::from("c")]);
        assert_eq!(store.calls.lock().expect("lock")[0].len(), 4);
    }

    #[test]
    fn nothing_present_skips_store_call() {
        let store = Arc::new(FakeStore::new(&[]));
        let service = BulkService::<Product>::new(store.clone());
        let mut selection = select(&["gone"]);

        let report = service
            .delete_selected(&mut selection, &[])
            .expect("delete should succeed");

        assert_eq!(report.summary("deleted"), "0 of 1 deleted");
        assert!(selection.is_empty());
        assert!(store.calls.lock().expect("lock").is_empty());
    }

    #[test]
    fn export_follows_sorted_order() {
        let products = vec![Product::new("b", "Beta"), Product::new("a", "Alpha")];
        let ordered: Vec<&Product> = products.iter().collect();
        let selection = select(&["a", "b", "gone"]);

        let picked = selected_in_order(&selection, &ordered);
        assert_eq!(picked[0].id, RecordId::from("b"));

        let bytes = export_selection(
            &selection,
            &ordered,
            &ExportLayout::product_labels(),
            &Product::columns(),
        )
        .expect("export should succeed");
        let text = String::from_utf8(bytes).expect("utf-8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("\"Beta\""));
    }
}
