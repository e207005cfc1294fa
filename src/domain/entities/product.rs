use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::record::{
    lenient_date, lenient_number, Categorized, Dated, Identified, RecordId,
};
use crate::domain::view::column::ColumnSet;

/// Fields matched by the product search box.
pub const PRODUCT_SEARCH_FIELDS: [&str; 5] =
    ["name", "description", "sku", "location", "category_name"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    #[serde(default)]
    pub category_id: Option<RecordId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity_in_stock: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub minimum_stock_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub purchase_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sale_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Nothing (or less) on hand is out of stock; at or under the minimum is low.
    pub fn of(quantity: f64, minimum: f64) -> Self {
        if quantity <= 0.0 {
            StockStatus::OutOfStock
        } else if quantity <= minimum {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl Product {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: RecordId::from(id),
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn quantity(&self) -> f64 {
        self.quantity_in_stock.unwrap_or(0.0)
    }

    pub fn minimum(&self) -> f64 {
        self.minimum_stock_level.unwrap_or(0.0)
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::of(self.quantity(), self.minimum())
    }

    /// On-hand quantity valued at the sale price.
    pub fn stock_value(&self) -> f64 {
        self.quantity() * self.sale_price.unwrap_or(0.0)
    }

    pub fn columns() -> ColumnSet<Product> {
        ColumnSet::<Product>::new()
            .text("name", |p| p.name.as_deref())
            .text("sku", |p| p.sku.as_deref())
            .text("barcode", |p| p.barcode.as_deref())
            .text("description", |p| p.description.as_deref())
            .text("location", |p| p.location.as_deref())
            .text("warehouses", |p| p.warehouse_name.as_deref())
            .text("category_name", |p| p.category_name.as_deref())
            .text("status", |p| p.status.as_deref())
            .number("stock", |p| p.quantity_in_stock)
            .number("minimum_stock_level", |p| p.minimum_stock_level)
            .number("purchase_price", |p| p.purchase_price)
            .number("sale_price", |p| p.sale_price)
            .number("unit_price", |p| p.unit_price)
            .date("created_at", |p| p.created_at)
    }
}

impl Identified for Product {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl Categorized for Product {
    fn category_id(&self) -> Option<&str> {
        self.category_id.as_ref().map(RecordId::as_str)
    }
}

impl Dated for Product {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(StockStatus::of(0.0, 5.0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::of(3.0, 5.0), StockStatus::LowStock);
        assert_eq!(StockStatus::of(5.0, 5.0), StockStatus::LowStock);
        assert_eq!(StockStatus::of(6.0, 5.0), StockStatus::InStock);
        assert_eq!(StockStatus::of(1.0, 0.0), StockStatus::InStock);
    }

    #[test]
    fn product_parses_string_numbers_from_store_json() {
        let product: Product = serde_json::from_str(
            r#"{"id":"p1","name":"Bolt","quantity_in_stock":"12","purchase_price":0.25,"minimum_stock_level":null,"created_at":"not a date"}"#,
        )
        .expect("product json should parse");

        assert_eq!(product.quantity_in_stock, Some(12.0));
        assert_eq!(product.purchase_price, Some(0.25));
        assert_eq!(product.minimum_stock_level, None);
        assert_eq!(product.created_at, None);
        assert_eq!(product.stock_status(), StockStatus::InStock);
    }
}
