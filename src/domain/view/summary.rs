use chrono::{DateTime, Utc};

use crate::domain::entities::product::{Product, StockStatus};

/// Dashboard figures over the currently filtered products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_stock_quantity: f64,
    /// Quantity valued at purchase price.
    pub total_stock_value: f64,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub average_purchase_price: f64,
    pub added_since_count: usize,
}

impl InventorySummary {
    pub fn from_products<'a>(
        products: impl IntoIterator<Item = &'a Product>,
        added_since: DateTime<Utc>,
    ) -> Self {
        let mut summary = InventorySummary::default();
        let mut purchase_total = 0.0;

        for product in products {
            let quantity = product.quantity();
            let cost = product.purchase_price.unwrap_or(0.0);

            summary.total_products += 1;
            summary.total_stock_quantity += quantity;
            summary.total_stock_value += quantity * cost;
            purchase_total += cost;

            match product.stock_status() {
                StockStatus::LowStock => summary.low_stock_count += 1,
                StockStatus::OutOfStock => summary.out_of_stock_count += 1,
                StockStatus::InStock => {}
            }

            if product.created_at.is_some_and(|created| created >= added_since) {
                summary.added_since_count += 1;
            }
        }

        if summary.total_products > 0 {
            summary.average_purchase_price = purchase_total / summary.total_products as f64;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn summary_counts_statuses_and_values() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().expect("valid date");
        let products = vec![
            Product {
                quantity_in_stock: Some(10.0),
                minimum_stock_level: Some(2.0),
                purchase_price: Some(3.0),
                created_at: Some(now + Duration::days(1)),
                ..Product::new("a", "A")
            },
            Product {
                quantity_in_stock: Some(1.0),
                minimum_stock_level: Some(2.0),
                purchase_price: Some(5.0),
                ..Product::new("b", "B")
            },
            Product {
                quantity_in_stock: Some(0.0),
                ..Product::new("c", "C")
            },
        ];

        let summary = InventorySummary::from_products(&products, now);

        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_stock_quantity, 11.0);
        assert_eq!(summary.total_stock_value, 35.0);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.out_of_stock_count, 1);
        assert!((summary.average_purchase_price - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.added_since_count, 1);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let summary = InventorySummary::from_products(&Vec::new(), Utc::now());

        assert_eq!(summary, InventorySummary::default());
    }
}
