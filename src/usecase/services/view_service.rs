use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::category::Category;
use crate::domain::entities::record::{Categorized, Identified, RecordId};
use crate::domain::view::column::ColumnSet;
use crate::domain::view::filter::{filter, in_categories, text_search, FilterSet, Predicate};
use crate::domain::view::paginate::{paginate, PageState};
use crate::domain::view::selection::SelectionSet;
use crate::domain::view::sort::{sort, SortSpec};
use crate::domain::view::tree::{ids_including_descendants, TreeError};
use crate::usecase::ports::record_store::{FetchFilters, RecordStore, StoreError};

/// Everything the user has chosen about how to look at a collection.
///
/// Changing search, category, filters or sort returns to page 1.
pub struct ViewState<T> {
    search: String,
    search_fields: Vec<String>,
    category: Option<RecordId>,
    filters: FilterSet<T>,
    sort: SortSpec,
    page: PageState,
    selection: SelectionSet,
}

impl<T> Clone for ViewState<T> {
    fn clone(&self) -> Self {
        Self {
            search: self.search.clone(),
            search_fields: self.search_fields.clone(),
            category: self.category.clone(),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            page: self.page,
            selection: self.selection.clone(),
        }
    }
}

impl<T: Identified + Categorized + 'static> ViewState<T> {
    pub fn new(items_per_page: usize, search_fields: &[&str]) -> Self {
        Self {
            search: String::new(),
            search_fields: search_fields.iter().map(|f| f.to_string()).collect(),
            category: None,
            filters: FilterSet::new(),
            sort: SortSpec::default(),
            page: PageState::new(items_per_page),
            selection: SelectionSet::new(),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: &str) {
        if self.search != text {
            self.search = text.to_string();
            self.page = self.page.first();
        }
    }

    pub fn category(&self) -> Option<&RecordId> {
        self.category.as_ref()
    }

    pub fn select_category(&mut self, category: Option<RecordId>) {
        if self.category != category {
            self.category = category;
            self.page = self.page.first();
        }
    }

    pub fn filters(&self) -> &FilterSet<T> {
        &self.filters
    }

    /// Installs or clears the predicate registered under `id`.
    pub fn set_filter(&mut self, id: &str, predicate: Option<Predicate<T>>) {
        self.filters.set(id, predicate);
        self.page = self.page.first();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.search.clear();
        self.category = None;
        self.page = self.page.first();
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Header click on `column`.
    pub fn sort_by(&mut self, column: &str) {
        self.set_sort(self.sort.select(column));
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
        self.page = self.page.first();
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn go_to_page(&mut self, page: usize, total_items: usize) {
        self.page = self.page.go_to(page, total_items);
    }

    pub fn next_page(&mut self, total_items: usize) {
        self.page = self.page.next(total_items);
    }

    pub fn previous_page(&mut self, total_items: usize) {
        self.page = self.page.previous(total_items);
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.page = self.page.with_items_per_page(items_per_page);
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    /// Runs the filter, sort and paginate pipeline over `records`.
    ///
    /// The stored page is re-clamped against the filtered size. A category
    /// cycle narrows to the selected category alone and is reported on the
    /// snapshot.
    pub fn project<'a>(
        &mut self,
        records: &'a [T],
        categories: &[Category],
        columns: &ColumnSet<T>,
    ) -> ViewSnapshot<'a, T> {
        let mut predicates = Vec::new();
        let mut integrity_error = None;

        if let Some(category) = self.category.as_ref() {
            let ids = match ids_including_descendants(category, categories) {
                Ok(ids) => ids,
                Err(err) => {
                    warn!(%category, error = %err, "category filter limited to selection");
                    integrity_error = Some(err);
                    vec![category.clone()]
                }
            };
            predicates.push(in_categories(ids));
        }

        let fields: Vec<&str> = self.search_fields.iter().map(String::as_str).collect();
        if let Some(search) = text_search(&self.search, columns, &fields) {
            predicates.push(search);
        }
        predicates.extend(self.filters.predicates());

        let filtered = sort(filter(records, &predicates), &self.sort, columns);
        self.page = self.page.clamped(filtered.len());
        let page = paginate(&filtered, self.page);

        debug!(
            total = records.len(),
            matched = page.total_items,
            page = page.current_page,
            "view projected"
        );

        ViewSnapshot {
            items: page.items,
            total_items: page.total_items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            filtered,
            integrity_error,
        }
    }
}

/// One rendered frame of the view.
#[derive(Debug)]
pub struct ViewSnapshot<'a, T> {
    /// Records on the current page.
    pub items: Vec<&'a T>,
    /// Every matching record in sorted order.
    pub filtered: Vec<&'a T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub integrity_error: Option<TreeError>,
}

impl<T: Identified> ViewSnapshot<'_, T> {
    pub fn page_ids(&self) -> Vec<RecordId> {
        self.items.iter().map(|r| r.record_id().clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Issued by [`DataView::begin_fetch`]; only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub categories: Vec<Category>,
}

/// The fetched collection plus its load status.
#[derive(Debug, Clone)]
pub struct DataView<T> {
    records: Vec<T>,
    categories: Vec<Category>,
    state: LoadState,
    generation: u64,
}

impl<T> Default for DataView<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            categories: Vec::new(),
            state: LoadState::Idle,
            generation: 0,
        }
    }
}

impl<T> DataView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        debug!(generation = self.generation, "fetch started");
        FetchTicket(self.generation)
    }

    /// Applies a finished fetch. Returns `false` when a newer fetch has started since.
    ///
    /// A failed fetch leaves an empty collection behind the error state.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Loaded<T>, StoreError>,
    ) -> bool {
        if ticket.0 != self.generation {
            info!(
                stale = ticket.0,
                current = self.generation,
                "discarding stale fetch result"
            );
            return false;
        }

        match result {
            Ok(loaded) => {
                info!(
                    records = loaded.records.len(),
                    categories = loaded.categories.len(),
                    "fetch finished"
                );
                self.records = loaded.records;
                self.categories = loaded.categories;
                self.state = LoadState::Ready;
            }
            Err(err) => {
                warn!(error = %err, "fetch failed");
                self.records.clear();
                self.categories.clear();
                self.state = LoadState::Failed(err.to_string());
            }
        }
        true
    }

    /// Drops records the store confirmed as deleted.
    pub fn remove_records(&mut self, ids: &[RecordId])
    where
        T: Identified,
    {
        self.records.retain(|r| !ids.contains(r.record_id()));
    }
}

pub struct ViewService<T> {
    store: Arc<dyn RecordStore<T>>,
}

impl<T> Clone for ViewService<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T> ViewService<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>) -> Self {
        Self { store }
    }

    pub fn load(&self, filters: &FetchFilters) -> Result<Loaded<T>, StoreError> {
        let categories = self.store.fetch_categories()?;
        let records = self.store.fetch_records(filters)?;
        Ok(Loaded {
            records,
            categories,
        })
    }

    /// Fetches and applies the result to `view` under a fresh ticket.
    pub fn refresh(&self, view: &mut DataView<T>, filters: &FetchFilters) -> bool {
        let ticket = view.begin_fetch();
        let result = self.load(filters);
        view.complete_fetch(ticket, result)
    }
}
