use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::domain::entities::category::Category;
use crate::domain::entities::record::{Identified, RecordId};
use crate::infra::sqlite::queries::{
    load_categories, load_record_bodies, purge_deleted_records, soft_delete_records,
    upsert_categories, upsert_records, RecordRow,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::record_store::{
    BulkOutcome, FetchFilters, RecordStore, StoreError, StoredRecord,
};

/// Local SQLite-backed record store, one instance per record type.
pub struct SqliteRecordStore<T> {
    db_path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T: StoredRecord> SqliteRecordStore<T> {
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        init_db(&db_path)?;
        Ok(Self {
            db_path,
            _records: PhantomData,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn save(&self, records: &[T]) -> Result<usize> {
        let rows = records
            .iter()
            .map(|record| -> Result<RecordRow> {
                let body = serde_json::to_string(record).with_context(|| {
                    format!("failed to encode {} record {}", T::COLLECTION, record.record_id())
                })?;
                Ok(RecordRow {
                    id: record.record_id().0.clone(),
                    category_id: record.category_key().map(str::to_string),
                    body,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let written = upsert_records(&self.db_path, T::COLLECTION, &rows)?;
        debug!(collection = T::COLLECTION, written, "records saved");
        Ok(written)
    }

    /// Loads a JSON array of records, the shape the remote store returns.
    pub fn seed_from_json(&self, json: &str) -> Result<usize> {
        let records: Vec<T> = serde_json::from_str(json)
            .with_context(|| format!("failed to parse {} seed json", T::COLLECTION))?;
        self.save(&records)
    }

    pub fn save_categories(&self, categories: &[Category]) -> Result<()> {
        upsert_categories(&self.db_path, categories)
    }

    pub fn seed_categories_from_json(&self, json: &str) -> Result<usize> {
        let categories: Vec<Category> =
            serde_json::from_str(json).context("failed to parse category seed json")?;
        self.save_categories(&categories)?;
        Ok(categories.len())
    }

    pub fn purge_deleted(&self) -> Result<usize> {
        let removed = purge_deleted_records(&self.db_path, T::COLLECTION)?;
        info!(collection = T::COLLECTION, removed, "purged soft-deleted records");
        Ok(removed)
    }
}

impl<T: StoredRecord> RecordStore<T> for SqliteRecordStore<T> {
    fn fetch_records(&self, filters: &FetchFilters) -> Result<Vec<T>, StoreError> {
        let bodies = load_record_bodies(
            &self.db_path,
            T::COLLECTION,
            filters.category_ids.as_deref(),
            filters.include_deleted,
        )?;

        bodies
            .iter()
            .map(|body| {
                serde_json::from_str(body).map_err(|err| StoreError::Malformed {
                    collection: T::COLLECTION.to_string(),
                    detail: err.to_string(),
                })
            })
            .collect()
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(load_categories(&self.db_path)?)
    }

    fn delete_records(&self, ids: &[RecordId]) -> Result<BulkOutcome, StoreError> {
        let (succeeded, missing) = soft_delete_records(&self.db_path, T::COLLECTION, ids)?;
        Ok(BulkOutcome {
            succeeded,
            failed: Vec::new(),
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::product::Product;

    fn store() -> (tempfile::TempDir, SqliteRecordStore<Product>) {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let store = SqliteRecordStore::<Product>::open(dir.path().join("stockflow.sqlite"))
            .expect("store should open");
        (dir, store)
    }

    #[test]
    fn open_creates_schema() {
        let (_dir, store) = store();

        let conn = rusqlite::Connection::open(store.db_path()).expect("should open sqlite db");
        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('record','category')",
                [],
                |row| row.get(0),
            )
            .expect("table count query should succeed");

        assert_eq!(table_count, 2, "required tables should exist");
    }

    #[test]
    fn seeded_records_round_trip_in_insertion_order() {
        let (_dir, store) = store();
        let written = store
            .seed_from_json(
                r#"[
                    {"id":"b","name":"Gadget","category_id":"tools","quantity_in_stock":"0"},
                    {"id":"a","name":"Widget","category_id":"paint","quantity_in_stock":5}
                ]"#,
            )
            .expect("seed should succeed");
        assert_eq!(written, 2);

        let all = store
            .fetch_records(&FetchFilters::default())
            .expect("fetch should succeed");
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(all[0].quantity_in_stock, Some(0.0));

        let tools_only = store
            .fetch_records(&FetchFilters {
                category_ids: Some(vec![RecordId::from("tools")]),
                include_deleted: false,
            })
            .expect("fetch should succeed");
        assert_eq!(tools_only.len(), 1);
        assert_eq!(tools_only[0].id, RecordId::from("b"));
    }

    #[test]
    fn delete_reports_per_id_outcome() {
        let (_dir, store) = store();
        store
            .save(&[Product::new("a", "A"), Product::new("b", "B")])
            .expect("save should succeed");

        let outcome = store
            .delete_records(&[RecordId::from("a"), RecordId::from("ghost")])
            .expect("delete should succeed");

        assert_eq!(outcome.succeeded, vec![RecordId::from("a")]);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.missing, vec![RecordId::from("ghost")]);

        let live = store
            .fetch_records(&FetchFilters::default())
            .expect("fetch should succeed");
        assert_eq!(live.len(), 1);

        let with_deleted = store
            .fetch_records(&FetchFilters {
                category_ids: None,
                include_deleted: true,
            })
            .expect("fetch should succeed");
        assert_eq!(with_deleted.len(), 2);

        assert_eq!(store.purge_deleted().expect("purge should succeed"), 1);
    }

    #[test]
    fn categories_round_trip_with_dangling_parent() {
        let (_dir, store) = store();
        let written = store
            .seed_categories_from_json(
                r#"[
                    {"id":"tools","name":"Tools"},
                    {"id":"drills","name":"Drills","parent_category_id":"tools","display_order":2},
                    {"id":"orphan","name":"Orphan","parent_id":"gone"}
                ]"#,
            )
            .expect("seed should succeed");
        assert_eq!(written, 3);

        let categories = store.fetch_categories().expect("fetch should succeed");

        assert_eq!(categories.len(), 3);
        assert_eq!(categories[1].parent_category_id, Some(RecordId::from("tools")));
        assert_eq!(categories[1].display_order, Some(2));
        assert_eq!(categories[2].parent_category_id, Some(RecordId::from("gone")));
    }
}
