//! Single-key stable sorting over typed columns.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::view::collate::CollationKey;
use crate::domain::view::column::{Accessor, ColumnSet, MissingValuePolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by(column: &str, direction: SortDirection) -> Self {
        Self {
            column: Some(column.to_string()),
            direction,
        }
    }

    /// Header click: the active column flips direction, any other column starts ascending.
    pub fn select(&self, column: &str) -> Self {
        if self.column.as_deref() == Some(column) {
            Self {
                column: self.column.clone(),
                direction: self.direction.toggled(),
            }
        } else {
            Self::by(column, SortDirection::Asc)
        }
    }

    pub fn is_active(&self, column: &str) -> bool {
        self.column.as_deref() == Some(column)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Text(CollationKey),
    Number(Option<f64>),
    Date(Option<i64>),
}

impl SortKey {
    fn of<T>(accessor: &Accessor<T>, item: &T) -> Self {
        match accessor {
            Accessor::Text(_) => {
                SortKey::Text(accessor.text(item).map(CollationKey::new).unwrap_or_default())
            }
            Accessor::Number(_) => SortKey::Number(accessor.number(item)),
            Accessor::Date(_) => {
                SortKey::Date(accessor.date(item).map(|value| value.timestamp_millis()))
            }
        }
    }
}

/// Sorts `records` by the active column of `spec`.
///
/// No active column, or one `columns` does not know, keeps the input order.
/// The sort is stable in both directions: `Desc` flips the comparator, so
/// equal keys keep their relative input order.
pub fn sort<'a, T>(records: Vec<&'a T>, spec: &SortSpec, columns: &ColumnSet<T>) -> Vec<&'a T> {
    let Some(name) = spec.column.as_deref() else {
        return records;
    };
    let Some(column) = columns.get(name) else {
        debug!(column = name, "sort column not registered, keeping input order");
        return records;
    };

    let policy = columns.missing_policy();
    let mut keyed: Vec<(SortKey, &'a T)> = records
        .into_iter()
        .map(|record| (SortKey::of(&column.accessor, record), record))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, spec.direction, policy));
    keyed.into_iter().map(|(_, record)| record).collect()
}

fn compare_keys(
    a: &SortKey,
    b: &SortKey,
    direction: SortDirection,
    policy: MissingValuePolicy,
) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => direction.apply(a.cmp(b)),
        (SortKey::Number(a), SortKey::Number(b)) => {
            compare_missing(*a, *b, 0.0, direction, policy, |a, b| {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            })
        }
        (SortKey::Date(a), SortKey::Date(b)) => {
            compare_missing(*a, *b, 0, direction, policy, Ord::cmp)
        }
        _ => Ordering::Equal,
    }
}

fn compare_missing<K: Copy>(
    a: Option<K>,
    b: Option<K>,
    zero: K,
    direction: SortDirection,
    policy: MissingValuePolicy,
    cmp: impl Fn(&K, &K) -> Ordering,
) -> Ordering {
    match policy {
        MissingValuePolicy::AsZero => {
            direction.apply(cmp(&a.unwrap_or(zero), &b.unwrap_or(zero)))
        }
        MissingValuePolicy::Last => match (a, b) {
            (Some(a), Some(b)) => direction.apply(cmp(&a, &b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::product::Product;
    use crate::domain::entities::record::Identified;

    fn stocked(id: &str, name: &str, qty: Option<f64>) -> Product {
        Product {
            quantity_in_stock: qty,
            ..Product::new(id, name)
        }
    }

    fn ids(items: &[&Product]) -> Vec<String> {
        items.iter().map(|p| p.record_id().to_string()).collect()
    }

    #[test]
    fn select_toggles_same_column_and_resets_on_switch() {
        let spec = SortSpec::default().select("name");
        assert_eq!(spec, SortSpec::by("name", SortDirection::Asc));

        let spec = spec.select("name");
        assert_eq!(spec.direction, SortDirection::Desc);

        let spec = spec.select("stock");
        assert_eq!(spec, SortSpec::by("stock", SortDirection::Asc));
    }

    #[test]
    fn no_column_keeps_input_order() {
        let products = vec![stocked("b", "B", Some(1.0)), stocked("a", "A", Some(2.0))];

        let sorted = sort(products.iter().collect(), &SortSpec::default(), &Product::columns());

        assert_eq!(ids(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn unknown_column_keeps_input_order() {
        let products = vec![stocked("b", "B", Some(1.0)), stocked("a", "A", Some(2.0))];
        let spec = SortSpec::by("nope", SortDirection::Asc);

        let sorted = sort(products.iter().collect(), &spec, &Product::columns());

        assert_eq!(ids(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn text_sort_ignores_case() {
        let products = vec![
            stocked("1", "banana", None),
            stocked("2", "Apple", None),
            stocked("3", "cherry", None),
        ];
        let spec = SortSpec::by("name", SortDirection::Asc);

        let sorted = sort(products.iter().collect(), &spec, &Product::columns());

        assert_eq!(ids(&sorted), vec!["2", "1", "3"]);
    }

    #[test]
    fn text_sort_places_accented_names_by_base_letter() {
        let products = vec![
            stocked("z", "zebra", None),
            stocked("e", "Éclair", None),
            stocked("a", "apple", None),
        ];

        let asc = sort(
            products.iter().collect(),
            &SortSpec::by("name", SortDirection::Asc),
            &Product::columns(),
        );
        let desc = sort(
            products.iter().collect(),
            &SortSpec::by("name", SortDirection::Desc),
            &Product::columns(),
        );

        assert_eq!(ids(&asc), vec!["a", "e", "z"]);
        assert_eq!(ids(&desc), vec!["z", "e", "a"]);
    }

    #[test]
    fn missing_numbers_sort_as_zero_by_default() {
        let products = vec![
            stocked("five", "A", Some(5.0)),
            stocked("missing", "B", None),
            stocked("neg", "C", Some(-1.0)),
        ];
        let spec = SortSpec::by("stock", SortDirection::Asc);

        let sorted = sort(products.iter().collect(), &spec, &Product::columns());

        assert_eq!(ids(&sorted), vec!["neg", "missing", "five"]);
    }

    #[test]
    fn missing_last_policy_holds_in_both_directions() {
        let products = vec![
            stocked("missing", "A", None),
            stocked("one", "B", Some(1.0)),
            stocked("two", "C", Some(2.0)),
        ];
        let columns = Product::columns().with_missing_policy(MissingValuePolicy::Last);

        let asc = sort(
            products.iter().collect(),
            &SortSpec::by("stock", SortDirection::Asc),
            &columns,
        );
        let desc = sort(
            products.iter().collect(),
            &SortSpec::by("stock", SortDirection::Desc),
            &columns,
        );

        assert_eq!(ids(&asc), vec!["one", "two", "missing"]);
        assert_eq!(ids(&desc), vec!["two", "one", "missing"]);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let products = vec![
            stocked("x", "X", Some(1.0)),
            stocked("y", "Y", Some(2.0)),
            stocked("z", "Z", Some(1.0)),
        ];

        let asc = sort(
            products.iter().collect(),
            &SortSpec::by("stock", SortDirection::Asc),
            &Product::columns(),
        );
        let desc = sort(
            products.iter().collect(),
            &SortSpec::by("stock", SortDirection::Desc),
            &Product::columns(),
        );

        assert_eq!(ids(&asc), vec!["x", "z", "y"]);
        assert_eq!(ids(&desc), vec!["y", "x", "z"]);
    }
}
