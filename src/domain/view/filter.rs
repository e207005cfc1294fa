//! Record predicates and their conjunction.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entities::product::{Product, StockStatus};
use crate::domain::entities::record::{Categorized, Dated, RecordId};
use crate::domain::view::column::{Accessor, ColumnSet};

/// Sale value (quantity × sale price) at which a product counts as high value.
pub const HIGH_VALUE_THRESHOLD: f64 = 1000.0;
pub const RECENTLY_ADDED_DAYS: i64 = 7;

pub struct Predicate<T> {
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            test: self.test.clone(),
        }
    }
}

impl<T: 'static> Predicate<T> {
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(test),
        }
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.test)(item)
    }

    pub fn and(self, other: Predicate<T>) -> Self {
        Predicate::new(move |item| self.matches(item) && other.matches(item))
    }
}

/// Keeps the records matching every predicate. No predicates keeps everything.
pub fn filter<'a, T: 'static>(
    records: impl IntoIterator<Item = &'a T>,
    predicates: &[Predicate<T>],
) -> Vec<&'a T> {
    records
        .into_iter()
        .filter(|record| predicates.iter().all(|p| p.matches(record)))
        .collect()
}

/// Named predicates combined with AND. Inserting under an existing id replaces it.
pub struct FilterSet<T> {
    predicates: BTreeMap<String, Predicate<T>>,
}

impl<T> Clone for FilterSet<T> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
        }
    }
}

impl<T> Default for FilterSet<T> {
    fn default() -> Self {
        Self {
            predicates: BTreeMap::new(),
        }
    }
}

impl<T: 'static> FilterSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, predicate: Predicate<T>) {
        self.predicates.insert(id.to_string(), predicate);
    }

    /// Inserts `predicate`, or removes `id` when there is nothing to filter on.
    pub fn set(&mut self, id: &str, predicate: Option<Predicate<T>>) {
        match predicate {
            Some(predicate) => self.insert(id, predicate),
            None => {
                self.remove(id);
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.predicates.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.predicates.contains_key(id)
    }

    pub fn clear(&mut self) {
        self.predicates.clear();
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    pub fn predicates(&self) -> Vec<Predicate<T>> {
        self.predicates.values().cloned().collect()
    }

    pub fn apply<'a>(&self, records: impl IntoIterator<Item = &'a T>) -> Vec<&'a T> {
        records
            .into_iter()
            .filter(|record| self.predicates.values().all(|p| p.matches(record)))
            .collect()
    }
}

fn text_accessors<T>(columns: &ColumnSet<T>, fields: &[&str]) -> Vec<Accessor<T>> {
    fields
        .iter()
        .filter_map(|field| match columns.get(field) {
            Some(column) if matches!(column.accessor, Accessor::Text(_)) => {
                Some(column.accessor.clone())
            }
            Some(_) => {
                warn!(field, "search field is not a text column");
                None
            }
            None => {
                warn!(field, "unknown search field");
                None
            }
        })
        .collect()
}

/// Case-insensitive substring match over any of `fields`.
///
/// A blank query yields `None`, which callers treat as "no filter".
pub fn text_search<T: 'static>(
    query: &str,
    columns: &ColumnSet<T>,
    fields: &[&str],
) -> Option<Predicate<T>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let accessors = text_accessors(columns, fields);
    Some(Predicate::new(move |item| {
        accessors.iter().any(|accessor| {
            accessor
                .text(item)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        })
    }))
}

/// Matches items whose category is one of `ids`. Uncategorized items never match.
pub fn in_categories<T>(ids: impl IntoIterator<Item = RecordId>) -> Predicate<T>
where
    T: Categorized + 'static,
{
    let ids: HashSet<RecordId> = ids.into_iter().collect();
    Predicate::new(move |item: &T| item.category_id().is_some_and(|id| ids.contains(id)))
}

/// Case-insensitive equality on a text column, e.g. a single location or warehouse.
pub fn text_equals<T: 'static>(
    columns: &ColumnSet<T>,
    column: &str,
    value: &str,
) -> Option<Predicate<T>> {
    let accessor = text_accessors(columns, &[column]).pop()?;
    let expected = value.to_lowercase();
    Some(Predicate::new(move |item| {
        accessor
            .text(item)
            .is_some_and(|actual| actual.to_lowercase() == expected)
    }))
}

/// Exact membership on a text column. An empty `values` list yields `None`.
pub fn text_in<T: 'static>(
    columns: &ColumnSet<T>,
    column: &str,
    values: &[String],
) -> Option<Predicate<T>> {
    if values.is_empty() {
        return None;
    }
    let accessor = text_accessors(columns, &[column]).pop()?;
    let allowed: HashSet<String> = values.iter().cloned().collect();
    Some(Predicate::new(move |item| {
        accessor
            .text(item)
            .is_some_and(|actual| allowed.contains(actual))
    }))
}

/// Matches products whose stock status is any of `statuses`.
pub fn stock_status_in(statuses: &[StockStatus]) -> Option<Predicate<Product>> {
    if statuses.is_empty() {
        return None;
    }
    let allowed: HashSet<StockStatus> = statuses.iter().copied().collect();
    Some(Predicate::new(move |product: &Product| {
        allowed.contains(&product.stock_status())
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
    Year,
}

impl DateRange {
    pub fn window(self) -> Option<Duration> {
        match self {
            DateRange::All => None,
            DateRange::Today => Some(Duration::hours(24)),
            DateRange::Week => Some(Duration::days(7)),
            DateRange::Month => Some(Duration::days(30)),
            DateRange::Year => Some(Duration::days(365)),
        }
    }
}

/// Items created within `range` of `now`. Undated items never match.
pub fn created_within<T>(range: DateRange, now: DateTime<Utc>) -> Option<Predicate<T>>
where
    T: Dated + 'static,
{
    let cutoff = now - range.window()?;
    Some(Predicate::new(move |item: &T| {
        item.created_at().is_some_and(|created| created >= cutoff)
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickFilter {
    LowStock,
    OutOfStock,
    RecentlyAdded,
    HighValue,
}

pub fn quick_filter(filter: QuickFilter, now: DateTime<Utc>) -> Predicate<Product> {
    match filter {
        QuickFilter::LowStock => {
            Predicate::new(|product: &Product| product.stock_status() == StockStatus::LowStock)
        }
        QuickFilter::OutOfStock => {
            Predicate::new(|product: &Product| product.stock_status() == StockStatus::OutOfStock)
        }
        QuickFilter::RecentlyAdded => {
            let cutoff = now - Duration::days(RECENTLY_ADDED_DAYS);
            Predicate::new(move |product: &Product| {
                product.created_at.is_some_and(|created| created >= cutoff)
            })
        }
        QuickFilter::HighValue => {
            Predicate::new(|product: &Product| product.stock_value() >= HIGH_VALUE_THRESHOLD)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::record::Identified;
    use chrono::TimeZone;

    fn product(id: &str, name: &str, qty: f64) -> Product {
        Product {
            quantity_in_stock: Some(qty),
            minimum_stock_level: Some(3.0),
            ..Product::new(id, name)
        }
    }

    fn ids<T: Identified>(items: &[&T]) -> Vec<String> {
        items.iter().map(|i| i.record_id().to_string()).collect()
    }

    #[test]
    fn empty_predicate_list_is_identity() {
        let products = vec![product("a", "Widget", 5.0), product("b", "Gadget", 0.0)];

        let kept = filter(&products, &[]);

        assert_eq!(ids(&kept), vec!["a", "b"]);
    }

    #[test]
    fn text_search_is_case_insensitive_across_fields() {
        let columns = Product::columns();
        let mut described = product("c", "Thing", 1.0);
        described.description = Some("Spare WIDGET part".to_string());
        let products = vec![product("a", "Widget", 5.0), product("b", "Gadget", 0.0), described];

        let search = text_search("widget", &columns, &["name", "description"]).expect("query");
        let kept = filter(&products, &[search]);

        assert_eq!(ids(&kept), vec!["a", "c"]);
    }

    #[test]
    fn blank_search_is_no_filter() {
        let columns = Product::columns();

        assert!(text_search("   ", &columns, &["name"]).is_none());
    }

    #[test]
    fn category_predicate_requires_membership() {
        let mut a = product("a", "A", 1.0);
        a.category_id = Some(RecordId::from("tools"));
        let mut b = product("b", "B", 1.0);
        b.category_id = Some(RecordId::from("paint"));
        let c = product("c", "C", 1.0);
        let products = vec![a, b, c];

        let predicate = in_categories::<Product>(vec![RecordId::from("tools")]);
        let kept = filter(&products, &[predicate]);

        assert_eq!(ids(&kept), vec!["a"]);
    }

    #[test]
    fn stock_status_predicate_matches_any_selected() {
        let products = vec![
            product("out", "Out", 0.0),
            product("low", "Low", 2.0),
            product("ok", "Ok", 10.0),
        ];

        let predicate = stock_status_in(&[StockStatus::OutOfStock, StockStatus::LowStock])
            .expect("statuses selected");
        let kept = filter(&products, &[predicate]);

        assert_eq!(ids(&kept), vec!["out", "low"]);
        assert!(stock_status_in(&[]).is_none());
    }

    #[test]
    fn location_filters_compare_as_documented() {
        let columns = Product::columns();
        let mut a = product("a", "A", 1.0);
        a.location = Some("Shelf A".to_string());
        let mut b = product("b", "B", 1.0);
        b.location = Some("shelf a".to_string());
        let products = vec![a, b];

        let single = text_equals(&columns, "location", "SHELF A").expect("text column");
        assert_eq!(ids(&filter(&products, &[single])), vec!["a", "b"]);

        let multi = text_in(&columns, "location", &["Shelf A".to_string()]).expect("values");
        assert_eq!(ids(&filter(&products, &[multi])), vec!["a"]);
    }

    #[test]
    fn date_range_and_quick_filters_use_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).single().expect("valid date");
        let mut fresh = product("fresh", "Fresh", 50.0);
        fresh.created_at = Some(now - Duration::days(2));
        fresh.sale_price = Some(25.0);
        let mut old = product("old", "Old", 1.0);
        old.created_at = Some(now - Duration::days(40));
        let undated = product("undated", "Undated", 1.0);
        let products = vec![fresh, old, undated];

        let week = created_within::<Product>(DateRange::Week, now).expect("bounded range");
        assert_eq!(ids(&filter(&products, &[week])), vec!["fresh"]);
        assert!(created_within::<Product>(DateRange::All, now).is_none());

        let recent = quick_filter(QuickFilter::RecentlyAdded, now);
        assert_eq!(ids(&filter(&products, &[recent])), vec!["fresh"]);

        let high_value = quick_filter(QuickFilter::HighValue, now);
        assert_eq!(ids(&filter(&products, &[high_value])), vec!["fresh"]);
    }

    #[test]
    fn filter_set_replaces_and_removes_by_id() {
        let products = vec![product("a", "A", 0.0), product("b", "B", 5.0)];
        let mut set = FilterSet::<Product>::new();

        set.insert("stock", Predicate::new(|p: &Product| p.quantity() > 0.0));
        assert_eq!(ids(&set.apply(&products)), vec!["b"]);

        set.insert("stock", Predicate::new(|p: &Product| p.quantity() == 0.0));
        assert_eq!(set.len(), 1);
        assert_eq!(ids(&set.apply(&products)), vec!["a"]);

        assert!(set.remove("stock"));
        assert!(set.is_empty());
        assert_eq!(ids(&set.apply(&products)), vec!["a", "b"]);
    }
}
