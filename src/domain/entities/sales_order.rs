use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::record::{lenient_date, lenient_number, Categorized, Dated, Identified, RecordId};
use crate::domain::view::column::ColumnSet;

pub const SALES_ORDER_SEARCH_FIELDS: [&str; 3] = ["order_number", "customer_name", "status"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub id: RecordId,
    pub order_number: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub expected_delivery: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SalesOrder {
    pub fn columns() -> ColumnSet<SalesOrder> {
        ColumnSet::<SalesOrder>::new()
            .text("order_number", |o| Some(o.order_number.as_str()))
            .text("customer_name", |o| o.customer_name.as_deref())
            .text("status", |o| Some(o.status.as_str()))
            .date("order_date", |o| o.order_date)
            .date("expected_delivery", |o| o.expected_delivery)
            .number("total_amount", |o| o.total_amount)
    }
}

impl Identified for SalesOrder {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

// Orders are not filed under a category.
impl Categorized for SalesOrder {
    fn category_id(&self) -> Option<&str> {
        None
    }
}

impl Dated for SalesOrder {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.order_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::view::filter::{filter, text_equals, text_search};
    use crate::domain::view::sort::{sort, SortDirection, SortSpec};
    use crate::usecase::services::view_service::ViewState;

    fn orders() -> Vec<SalesOrder> {
        serde_json::from_str(
            r#"[
                {"id":"1","order_number":"SO-001","customer_name":"Acme","status":"pending",
                 "order_date":"2024-03-02","total_amount":"120.50"},
                {"id":"2","order_number":"SO-002","customer_name":"Globex","status":"Shipped",
                 "order_date":"2024-03-01T08:00:00Z","total_amount":80},
                {"id":"3","order_number":"SO-003","status":"pending"}
            ]"#,
        )
        .expect("orders should parse")
    }

    #[test]
    fn status_filter_ignores_case() {
        let orders = orders();
        let columns = SalesOrder::columns();
        let shipped = text_equals(&columns, "status", "shipped").expect("status is text");

        let matched = filter(&orders, &[shipped]);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].order_number, "SO-002");
    }

    #[test]
    fn search_and_sort_by_order_date() {
        let orders = orders();
        let columns = SalesOrder::columns();
        let search = text_search("so-00", &columns, &SALES_ORDER_SEARCH_FIELDS)
            .expect("query is not blank");

        let sorted = sort(
            filter(&orders, &[search]),
            &SortSpec::by("order_date", SortDirection::Desc),
            &columns,
        );

        let numbers: Vec<&str> = sorted.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["SO-001", "SO-002", "SO-003"]);
    }

    #[test]
    fn created_at_falls_back_to_order_date() {
        let orders = orders();

        assert_eq!(orders[1].created_at(), orders[1].order_date);
        assert_eq!(orders[2].created_at(), None);
        assert_eq!(orders[0].total_amount, Some(120.5));
    }

    #[test]
    fn orders_page_through_view_state() {
        let orders = orders();
        let columns = SalesOrder::columns();
        let mut state = ViewState::<SalesOrder>::new(1, &SALES_ORDER_SEARCH_FIELDS);
        state.set_sort(SortSpec::by("order_number", SortDirection::Desc));
        state.set_filter("status", text_equals(&columns, "status", "PENDING"));

        let first = state.project(&orders, &[], &columns);
        assert_eq!((first.total_items, first.total_pages), (2, 2));
        assert_eq!(first.items[0].order_number, "SO-003");

        state.next_page(first.total_items);
        let second = state.project(&orders, &[], &columns);
        assert_eq!(second.current_page, 2);
        assert_eq!(second.items[0].order_number, "SO-001");

        state.set_search("acme");
        let searched = state.project(&orders, &[], &columns);
        assert_eq!(searched.current_page, 1);
        assert_eq!(searched.page_ids(), vec![RecordId::from("1")]);
    }
}
