//! Typed column accessors.
//!
//! A [`ColumnSet`] maps a column name to an extraction function with an
//! explicit value kind, so comparators and search never look at untyped data.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::record::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

/// How numeric and date columns treat missing values when sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingValuePolicy {
    /// Missing numbers sort as `0`, missing dates as the epoch.
    #[default]
    AsZero,
    /// Missing values sort after present ones in both directions.
    Last,
}

type TextFn<T> = Arc<dyn Fn(&T) -> Option<&str> + Send + Sync>;
type NumberFn<T> = Arc<dyn Fn(&T) -> Option<f64> + Send + Sync>;
type DateFn<T> = Arc<dyn Fn(&T) -> Option<DateTime<Utc>> + Send + Sync>;

pub enum Accessor<T> {
    Text(TextFn<T>),
    Number(NumberFn<T>),
    Date(DateFn<T>),
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Text(f) => Accessor::Text(f.clone()),
            Accessor::Number(f) => Accessor::Number(f.clone()),
            Accessor::Date(f) => Accessor::Date(f.clone()),
        }
    }
}

impl<T> Accessor<T> {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Accessor::Text(_) => ColumnKind::Text,
            Accessor::Number(_) => ColumnKind::Number,
            Accessor::Date(_) => ColumnKind::Date,
        }
    }

    pub fn text<'a>(&self, item: &'a T) -> Option<&'a str> {
        match self {
            Accessor::Text(f) => f(item),
            _ => None,
        }
    }

    pub fn number(&self, item: &T) -> Option<f64> {
        match self {
            Accessor::Number(f) => f(item).filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    pub fn date(&self, item: &T) -> Option<DateTime<Utc>> {
        match self {
            Accessor::Date(f) => f(item),
            _ => None,
        }
    }

    /// Cell rendering used by tables and CSV export. Missing values render empty.
    pub fn display(&self, item: &T) -> String {
        match self {
            Accessor::Text(f) => f(item).unwrap_or_default().to_string(),
            Accessor::Number(f) => f(item).map(format_number).unwrap_or_default(),
            Accessor::Date(f) => f(item)
                .map(|value| value.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Whole numbers render without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub struct Column<T> {
    pub name: String,
    pub accessor: Accessor<T>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            accessor: self.accessor.clone(),
        }
    }
}

pub struct ColumnSet<T> {
    columns: Vec<Column<T>>,
    missing: MissingValuePolicy,
}

impl<T> Clone for ColumnSet<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            missing: self.missing,
        }
    }
}

impl<T> Default for ColumnSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ColumnSet<T> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            missing: MissingValuePolicy::default(),
        }
    }

    pub fn text<F>(mut self, name: &str, extract: F) -> Self
    where
        F: Fn(&T) -> Option<&str> + Send + Sync + 'static,
    {
        self.push(name, Accessor::Text(Arc::new(extract)));
        self
    }

    pub fn number<F>(mut self, name: &str, extract: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        self.push(name, Accessor::Number(Arc::new(extract)));
        self
    }

    pub fn date<F>(mut self, name: &str, extract: F) -> Self
    where
        F: Fn(&T) -> Option<DateTime<Utc>> + Send + Sync + 'static,
    {
        self.push(name, Accessor::Date(Arc::new(extract)));
        self
    }

    pub fn with_missing_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing = policy;
        self
    }

    pub fn missing_policy(&self) -> MissingValuePolicy {
        self.missing
    }

    pub fn get(&self, name: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    // Later registrations replace earlier ones with the same name.
    fn push(&mut self, name: &str, accessor: Accessor<T>) {
        self.columns.retain(|column| column.name != name);
        self.columns.push(Column {
            name: name.to_string(),
            accessor,
        });
    }
}

impl ColumnSet<Record> {
    /// Accessors for generic records, reading each named field with the given kind.
    pub fn for_fields(fields: &[(&str, ColumnKind)]) -> Self {
        fields
            .iter()
            .fold(ColumnSet::<Record>::new(), |set, (name, kind)| {
                let field = name.to_string();
                match kind {
                    ColumnKind::Text => set.text(name, move |record| {
                        record.field(&field).and_then(FieldValue::as_str)
                    }),
                    ColumnKind::Number => set.number(name, move |record| {
                        record.field(&field).and_then(FieldValue::as_number)
                    }),
                    ColumnKind::Date => set.date(name, move |record| {
                        record.field(&field).and_then(FieldValue::as_date)
                    }),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_columns_extract_typed_values() {
        let columns = ColumnSet::<Record>::for_fields(&[
            ("name", ColumnKind::Text),
            ("qty", ColumnKind::Number),
            ("created_at", ColumnKind::Date),
        ]);
        let record = Record::new("a")
            .with_field("name", "Widget")
            .with_field("qty", "7")
            .with_field("created_at", "2024-05-01T00:00:00Z");

        let name = columns.get("name").expect("name column");
        let qty = columns.get("qty").expect("qty column");
        let created = columns.get("created_at").expect("created_at column");

        assert_eq!(name.accessor.text(&record), Some("Widget"));
        assert_eq!(qty.accessor.number(&record), Some(7.0));
        assert_eq!(qty.accessor.kind(), ColumnKind::Number);
        assert!(created.accessor.date(&record).is_some());
        assert_eq!(qty.accessor.display(&record), "7");
    }

    #[test]
    fn registering_same_name_replaces_column() {
        let columns = ColumnSet::<Record>::new()
            .text("name", |_| Some("first"))
            .text("name", |_| Some("second"));

        assert_eq!(columns.len(), 1);
        let name = columns.get("name").expect("name column");
        assert_eq!(name.accessor.text(&Record::new("x")), Some("second"));
    }

    #[test]
    fn format_number_drops_trailing_zero_fraction() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-3.0), "-3");
    }
}
