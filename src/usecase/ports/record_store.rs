use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::entities::category::Category;
use crate::domain::entities::product::Product;
use crate::domain::entities::record::{Identified, RecordId};
use crate::domain::entities::sales_order::SalesOrder;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Message(String),
    #[error("malformed {collection} record: {detail}")]
    Malformed { collection: String, detail: String },
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Message(format!("{err:#}"))
    }
}

/// Server-side narrowing applied before records reach the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchFilters {
    /// Only records in these categories. `None` means every category.
    pub category_ids: Option<Vec<RecordId>>,
    pub include_deleted: bool,
}

/// Per-id result of a bulk store call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: Vec<RecordId>,
    pub failed: Vec<RecordId>,
    /// Ids the store no longer holds, e.g. deleted elsewhere since the last fetch.
    pub missing: Vec<RecordId>,
}

/// Record types the store knows how to persist.
pub trait StoredRecord: Identified + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn category_key(&self) -> Option<&str> {
        None
    }
}

impl StoredRecord for Product {
    const COLLECTION: &'static str = "products";

    fn category_key(&self) -> Option<&str> {
        self.category_id.as_ref().map(RecordId::as_str)
    }
}

impl StoredRecord for SalesOrder {
    const COLLECTION: &'static str = "sales_orders";
}

/// The remote record store as seen by the view layer.
pub trait RecordStore<T>: Send + Sync {
    fn fetch_records(&self, filters: &FetchFilters) -> Result<Vec<T>, StoreError>;
    fn fetch_categories(&self) -> Result<Vec<Category>, StoreError>;
    fn delete_records(&self, ids: &[RecordId]) -> Result<BulkOutcome, StoreError>;
}
