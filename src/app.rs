use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::config::AppConfig;
use crate::domain::entities::category::CategoryNode;
use crate::domain::entities::product::{Product, StockStatus};
use crate::domain::entities::record::RecordId;
use crate::domain::view::column::format_number;
use crate::domain::view::filter::{
    created_within, quick_filter, stock_status_in, DateRange, QuickFilter, RECENTLY_ADDED_DAYS,
};
use crate::domain::view::summary::InventorySummary;
use crate::domain::view::tree::build_tree;
use crate::infra::export::csv::{write_export, ExportLayout};
use crate::infra::sqlite::store::SqliteRecordStore;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::AppState;
use crate::ui::style::{
    body_style, category_panel_style, cell_alignment, page_label, root_container_style,
    sort_indicator, table_container_style, table_header_cell_style,
};
use crate::usecase::ports::record_store::{FetchFilters, RecordStore};
use crate::usecase::services::bulk_service::{export_selection, BulkService};
use crate::usecase::services::view_service::{DataView, LoadState, ViewService, ViewState};

const TABLE_COLUMNS: [(&str, &str); 7] = [
    ("Name", "name"),
    ("SKU", "sku"),
    ("Category", "category_name"),
    ("Location", "location"),
    ("Stock", "stock"),
    ("Sale price", "sale_price"),
    ("Added", "created_at"),
];

const PAGE_SIZES: [usize; 4] = [25, 50, 100, 200];

const QUICK_FILTERS: [(QuickFilter, &str, &str); 4] = [
    (QuickFilter::LowStock, "quick-low-stock", "Low stock"),
    (QuickFilter::OutOfStock, "quick-out-of-stock", "Out of stock"),
    (QuickFilter::RecentlyAdded, "quick-recent", "Recently added"),
    (QuickFilter::HighValue, "quick-high-value", "High value"),
];

struct ProductRow {
    key: String,
    id: RecordId,
    selected: bool,
    stock_label: &'static str,
    cells: Vec<(String, &'static str)>,
}

fn stock_statuses(value: &str) -> Vec<StockStatus> {
    match value {
        "in-stock" => vec![StockStatus::InStock],
        "low-stock" => vec![StockStatus::LowStock],
        "out-of-stock" => vec![StockStatus::OutOfStock],
        "needs-attention" => vec![StockStatus::LowStock, StockStatus::OutOfStock],
        _ => Vec::new(),
    }
}

fn date_range(value: &str) -> DateRange {
    match value {
        "today" => DateRange::Today,
        "week" => DateRange::Week,
        "month" => DateRange::Month,
        "year" => DateRange::Year,
        _ => DateRange::All,
    }
}

// Writes the re-clamped page back after the collection changes size.
fn sync_page(mut view: Signal<ViewState<Product>>, data: Signal<DataView<Product>>) {
    let current = data.peek();
    view.write().project(current.records(), current.categories(), &Product::columns());
}

fn reload(
    service: &ViewService<Product>,
    mut data: Signal<DataView<Product>>,
    view: Signal<ViewState<Product>>,
    mut busy: Signal<bool>,
    mut status: Signal<String>,
) {
    *busy.write() = true;
    let ticket = data.write().begin_fetch();
    let result = run_blocking("fetch products", || service.load(&FetchFilters::default()));
    let failure = result.as_ref().err().map(ToString::to_string);
    if data.write().complete_fetch(ticket, result) {
        *status.write() = match failure {
            Some(err) => format!("Failed to load products: {err}"),
            None => format!("Loaded {} products", data.peek().records().len()),
        };
        sync_page(view, data);
    }
    *busy.write() = false;
}

#[component]
fn CategoryBranch(
    node: CategoryNode,
    depth: usize,
    selected: Option<RecordId>,
    on_select: EventHandler<RecordId>,
) -> Element {
    let id = node.id().clone();
    let name = node.category.name.clone();
    let indent = depth * 14;
    let weight = if selected.as_ref() == Some(&id) {
        "bold"
    } else {
        "normal"
    };

    rsx! {
        div {
            style: "padding: 2px 0 2px {indent}px; cursor: pointer; font-weight: {weight};",
            onclick: move |_| on_select.call(id.clone()),
            "{name}"
        }
        for (key, child) in node.children.iter().map(|child| (child.id().to_string(), child.clone())) {
            CategoryBranch {
                key: "{key}",
                node: child,
                depth: depth + 1,
                selected: selected.clone(),
                on_select,
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let config = use_context::<AppConfig>();
    let AppState {
        mut data,
        mut view,
        mut busy,
        mut status,
    } = AppState::new(&config);

    let columns = use_hook(Product::columns);
    let store = use_hook(|| {
        SqliteRecordStore::<Product>::open(config.db_path.clone())
            .map(Arc::new)
            .map_err(|err| format!("{err:#}"))
    });

    let store_for_init = store.clone();
    use_effect(move || {
        let Ok(store) = store_for_init.as_ref() else {
            return;
        };
        let port: Arc<dyn RecordStore<Product>> = store.clone();
        reload(&ViewService::new(port), data, view, busy, status);
    });

    let store = match store {
        Ok(store) => store,
        Err(err) => {
            return rsx! {
                div {
                    p { "Unable to open the local store: {err}" }
                }
            };
        }
    };

    let port: Arc<dyn RecordStore<Product>> = store.clone();
    let view_service = ViewService::new(port.clone());
    let bulk_service = Arc::new(BulkService::new(port));

    let data_ref = data.read();
    let mut state = view.read().clone();
    let snapshot = state.project(data_ref.records(), data_ref.categories(), &columns);

    let (tree, tree_error) = match build_tree(data_ref.categories()) {
        Ok(tree) => (tree, None),
        Err(err) => (Vec::new(), Some(err.to_string())),
    };
    let integrity_message = tree_error.or_else(|| {
        snapshot
            .integrity_error
            .as_ref()
            .map(|err| format!("Category data problem: {err}"))
    });
    let load_message = match data_ref.state() {
        LoadState::Loading => Some("Loading products...".to_string()),
        LoadState::Failed(err) => Some(format!("Could not load products: {err}")),
        LoadState::Idle | LoadState::Ready => None,
    };

    let summary = InventorySummary::from_products(
        snapshot.filtered.iter().copied(),
        Utc::now() - Duration::days(RECENTLY_ADDED_DAYS),
    );
    let InventorySummary {
        total_products,
        low_stock_count: low_stock,
        out_of_stock_count: out_of_stock,
        added_since_count: added_this_week,
        ..
    } = summary;
    let total_units = format_number(summary.total_stock_quantity);
    let total_value = format_number(summary.total_stock_value);

    let rows: Vec<ProductRow> = snapshot
        .items
        .iter()
        .map(|product| {
            let cells = TABLE_COLUMNS
                .iter()
                .map(|(_, name)| match columns.get(name) {
                    Some(column) => (
                        column.accessor.display(product),
                        cell_alignment(column.accessor.kind()),
                    ),
                    None => (String::new(), "left"),
                })
                .collect();
            ProductRow {
                key: product.id.to_string(),
                id: product.id.clone(),
                selected: state.selection().is_selected(&product.id),
                stock_label: product.stock_status().label(),
                cells,
            }
        })
        .collect();

    let page_ids = snapshot.page_ids();
    let all_on_page = state.selection().all_selected(&page_ids);
    let selected_count = state.selection().selected_count();
    let total_items = snapshot.total_items;
    let has_previous = state.page().has_previous();
    let has_next = state.page().has_next(total_items);
    let pager = page_label(snapshot.current_page, snapshot.total_pages, total_items);
    let items_per_page = state.page().items_per_page();
    let selected_category = state.category().cloned();
    let search_text = state.search().to_string();
    let headers: Vec<(&'static str, &'static str, &'static str)> = TABLE_COLUMNS
        .iter()
        .map(|(label, name)| (*label, *name, sort_indicator(state.sort(), name)))
        .collect();
    let quick_filters: Vec<(QuickFilter, &'static str, &'static str, bool)> = QUICK_FILTERS
        .iter()
        .map(|(filter, key, label)| (*filter, *key, *label, state.filters().contains(key)))
        .collect();

    let service_for_refresh = view_service.clone();
    let service_for_import = view_service.clone();
    let store_for_import = store.clone();
    let bulk_for_delete = bulk_service.clone();
    let columns_for_export = columns.clone();

    rsx! {
        div {
            style: "{root_container_style()}",
            nav {
                style: "display: flex; gap: 12px; align-items: center; flex-wrap: wrap;",
                button {
                    disabled: busy(),
                    onclick: move |_| reload(&service_for_refresh, data, view, busy, status),
                    "Refresh"
                }
                button {
                    disabled: busy(),
                    onclick: move |_| {
                        let Some(path) = FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .pick_file() else {
                            *status.write() = "Import cancelled".to_string();
                            return;
                        };
                        let result = run_blocking("import products", || -> anyhow::Result<usize> {
                            let json = std::fs::read_to_string(&path)?;
                            store_for_import.seed_from_json(&json)
                        });
                        match result {
                            Ok(count) => {
                                reload(&service_for_import, data, view, busy, status);
                                *status.write() = format!("Imported {count} products");
                            }
                            Err(err) => *status.write() = format!("Import failed: {err:#}"),
                        }
                    },
                    "Import JSON"
                }
                input {
                    placeholder: "Search name, SKU, location...",
                    value: "{search_text}",
                    oninput: move |event| view.write().set_search(&event.value()),
                }
                select {
                    onchange: move |event| {
                        let statuses = stock_statuses(&event.value());
                        view.write().set_filter("stock-status", stock_status_in(&statuses));
                    },
                    option { value: "all", "All stock levels" }
                    option { value: "in-stock", "In stock" }
                    option { value: "low-stock", "Low stock" }
                    option { value: "out-of-stock", "Out of stock" }
                    option { value: "needs-attention", "Low or out" }
                }
                select {
                    onchange: move |event| {
                        let range = date_range(&event.value());
                        view.write().set_filter("created", created_within(range, Utc::now()));
                    },
                    option { value: "all", "Any date" }
                    option { value: "today", "Today" }
                    option { value: "week", "Last 7 days" }
                    option { value: "month", "Last 30 days" }
                    option { value: "year", "Last year" }
                }
                for (filter, key, label, active) in quick_filters {
                    button {
                        key: "{key}",
                        style: if active { "font-weight: bold;" } else { "" },
                        onclick: move |_| {
                            let predicate = (!active).then(|| quick_filter(filter, Utc::now()));
                            view.write().set_filter(key, predicate);
                        },
                        "{label}"
                    }
                }
                button {
                    onclick: move |_| view.write().clear_filters(),
                    "Clear filters"
                }
            }

            div {
                style: "display: flex; gap: 16px; flex-wrap: wrap;",
                span { "Products: {total_products}" }
                span { "Units: {total_units}" }
                span { "Stock value: {total_value}" }
                span { "Low stock: {low_stock}" }
                span { "Out of stock: {out_of_stock}" }
                span { "New this week: {added_this_week}" }
            }

            if let Some(message) = load_message {
                p { style: "margin: 0; color: #555;", "{message}" }
            }
            if let Some(message) = integrity_message {
                p { style: "margin: 0; color: #b00;", "{message}" }
            }

            div {
                style: "{body_style()}",
                div {
                    style: "{category_panel_style()}",
                    div {
                        style: if selected_category.is_none() { "cursor: pointer; font-weight: bold;" } else { "cursor: pointer;" },
                        onclick: move |_| view.write().select_category(None),
                        "All categories"
                    }
                    for (key, node) in tree.into_iter().map(|node| (node.id().to_string(), node)) {
                        CategoryBranch {
                            key: "{key}",
                            node,
                            depth: 0,
                            selected: selected_category.clone(),
                            on_select: move |id: RecordId| view.write().select_category(Some(id)),
                        }
                    }
                }

                div {
                    style: "display: flex; flex-direction: column; flex: 1; min-width: 0; gap: 8px;",
                    div {
                        style: "display: flex; gap: 8px; align-items: center;",
                        span { "{selected_count} selected" }
                        button {
                            disabled: busy() || selected_count == 0,
                            onclick: move |_| {
                                let confirmed = MessageDialog::new()
                                    .set_level(MessageLevel::Warning)
                                    .set_title("Delete products")
                                    .set_description(format!("Delete {selected_count} selected products?"))
                                    .set_buttons(MessageButtons::YesNo)
                                    .show();
                                if confirmed != MessageDialogResult::Yes {
                                    return;
                                }

                                *busy.write() = true;
                                let result = {
                                    let current = data.peek();
                                    let mut state = view.write();
                                    run_blocking("delete products", || {
                                        bulk_for_delete.delete_selected(state.selection_mut(), current.records())
                                    })
                                };
                                match result {
                                    Ok(report) => {
                                        data.write().remove_records(&report.succeeded);
                                        sync_page(view, data);
                                        *status.write() = report.summary("deleted");
                                    }
                                    Err(err) => *status.write() = format!("Delete failed: {err}"),
                                }
                                *busy.write() = false;
                            },
                            "Delete selected"
                        }
                        button {
                            disabled: selected_count == 0,
                            onclick: move |_| {
                                let layout = ExportLayout::product_labels();
                                let Some(path) = FileDialog::new()
                                    .add_filter("CSV", &["csv"])
                                    .set_file_name(layout.file_name(Local::now().date_naive()))
                                    .save_file() else {
                                    *status.write() = "Export cancelled".to_string();
                                    return;
                                };

                                let exported = {
                                    let current = data.peek();
                                    let mut state = view.peek().clone();
                                    let snapshot = state.project(
                                        current.records(),
                                        current.categories(),
                                        &columns_for_export,
                                    );
                                    export_selection(
                                        state.selection(),
                                        &snapshot.filtered,
                                        &layout,
                                        &columns_for_export,
                                    )
                                };
                                match exported.and_then(|bytes| write_export(&path, &bytes)) {
                                    Ok(()) => *status.write() = format!("Exported to {}", path.display()),
                                    Err(err) => *status.write() = format!("Export failed: {err:#}"),
                                }
                            },
                            "Export labels"
                        }
                        button {
                            onclick: move |_| view.write().selection_mut().clear(),
                            "Clear selection"
                        }
                    }

                    div {
                        style: "{table_container_style()}",
                        table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                            thead {
                                tr {
                                    th { style: "{table_header_cell_style()}",
                                        input {
                                            r#type: "checkbox",
                                            checked: all_on_page,
                                            onclick: move |_| {
                                                let mut state = view.write();
                                                if all_on_page {
                                                    state.selection_mut().deselect_all(&page_ids);
                                                } else {
                                                    state.selection_mut().select_all(&page_ids);
                                                }
                                            }
                                        }
                                    }
                                    for (label, name, indicator) in headers {
                                        th {
                                            key: "{name}",
                                            style: "{table_header_cell_style()}",
                                            onclick: move |_| view.write().sort_by(name),
                                            "{label}{indicator}"
                                        }
                                    }
                                    th { style: "{table_header_cell_style()}", "Status" }
                                }
                            }
                            tbody {
                                for ProductRow { key, id, selected, stock_label, cells } in rows {
                                    tr {
                                        key: "{key}",
                                        style: if selected { "background: #eef4ff;" } else { "" },
                                        td { style: "border: 1px solid #bbb; padding: 4px; text-align: center;",
                                            input {
                                                r#type: "checkbox",
                                                checked: selected,
                                                onclick: move |_| {
                                                    view.write().selection_mut().toggle(&id);
                                                }
                                            }
                                        }
                                        for (value, alignment) in cells {
                                            td { style: "border: 1px solid #bbb; padding: 4px; text-align: {alignment};",
                                                "{value}"
                                            }
                                        }
                                        td { style: "border: 1px solid #bbb; padding: 4px;", "{stock_label}" }
                                    }
                                }
                            }
                        }
                    }

                    div {
                        style: "display: flex; gap: 8px; align-items: center;",
                        button {
                            disabled: !has_previous,
                            onclick: move |_| view.write().previous_page(total_items),
                            "Previous"
                        }
                        span { "{pager}" }
                        button {
                            disabled: !has_next,
                            onclick: move |_| view.write().next_page(total_items),
                            "Next"
                        }
                        select {
                            onchange: move |event| {
                                if let Ok(size) = event.value().parse::<usize>() {
                                    view.write().set_items_per_page(size);
                                }
                            },
                            for size in PAGE_SIZES {
                                option {
                                    value: "{size}",
                                    selected: size == items_per_page,
                                    "{size} per page"
                                }
                            }
                        }
                    }
                }
            }

            footer { style: "color: #555;", "{status}" }
        }
    }
}
