use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::view::column::ColumnSet;

/// One output column: the header text and the `ColumnSet` entry it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    pub header: String,
    pub column: String,
}

impl ExportColumn {
    pub fn new(header: &str, column: &str) -> Self {
        Self {
            header: header.to_string(),
            column: column.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    pub file_prefix: String,
    pub columns: Vec<ExportColumn>,
}

impl ExportLayout {
    /// Label sheet for selected products.
    pub fn product_labels() -> Self {
        Self {
            file_prefix: "product_labels".to_string(),
            columns: vec![
                ExportColumn::new("Name", "name"),
                ExportColumn::new("SKU", "sku"),
                ExportColumn::new("Barcode", "barcode"),
                ExportColumn::new("Location", "location"),
                ExportColumn::new("Stock", "stock"),
            ],
        }
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        default_export_file_name(&self.file_prefix, date)
    }
}

pub fn default_export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.csv", date.format("%Y-%m-%d"))
}

/// Renders `records` as CSV. Every field is quoted and embedded quotes are doubled.
pub fn export_records<'a, T: 'a>(
    records: impl IntoIterator<Item = &'a T>,
    layout: &ExportLayout,
    columns: &ColumnSet<T>,
) -> Result<Vec<u8>> {
    let accessors = layout
        .columns
        .iter()
        .map(|export| {
            columns
                .get(&export.column)
                .map(|column| &column.accessor)
                .ok_or_else(|| anyhow!("unknown export column: {}", export.column))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(layout.columns.iter().map(|c| c.header.as_str()))
        .context("failed to write csv header")?;
    for record in records {
        writer
            .write_record(accessors.iter().map(|accessor| accessor.display(record)))
            .context("failed to write csv row")?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush csv export: {}", err.error()))
}

pub fn write_export(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write export: {}", path.display()))
}
