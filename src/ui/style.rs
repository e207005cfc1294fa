use crate::domain::view::column::ColumnKind;
use crate::domain::view::sort::{SortDirection, SortSpec};

pub fn root_container_style() -> &'static str {
    "display: flex; flex-direction: column; height: 100vh; gap: 8px; padding: 8px; box-sizing: border-box;"
}

pub fn body_style() -> &'static str {
    "display: flex; flex: 1; min-height: 0; gap: 12px;"
}

pub fn category_panel_style() -> &'static str {
    "width: 220px; flex-shrink: 0; overflow: auto; border-right: 1px solid #ddd; padding-right: 8px;"
}

pub fn table_container_style() -> &'static str {
    "flex: 1; min-height: 0; overflow: auto;"
}

pub fn table_header_cell_style() -> &'static str {
    "position: sticky; top: 0; background: #f3f3f3; border: 1px solid #bbb; padding: 4px 6px; cursor: pointer; white-space: nowrap;"
}

pub fn cell_alignment(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Number => "right",
        ColumnKind::Text | ColumnKind::Date => "left",
    }
}

pub fn sort_indicator(spec: &SortSpec, column: &str) -> &'static str {
    if !spec.is_active(column) {
        return "";
    }
    match spec.direction {
        SortDirection::Asc => " ▲",
        SortDirection::Desc => " ▼",
    }
}

pub fn page_label(current_page: usize, total_pages: usize, total_items: usize) -> String {
    format!("Page {current_page} of {total_pages} ({total_items} items)")
}
