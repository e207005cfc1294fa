use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 100;

/// 1-based page position. `items_per_page` is always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    current_page: usize,
    items_per_page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl PageState {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.items_per_page).max(1)
    }

    /// Moves to `page`, clamped into `[1, total_pages]`.
    pub fn go_to(self, page: usize, total_items: usize) -> Self {
        let last = self.total_pages(total_items);
        let clamped = page.clamp(1, last);
        if clamped != page {
            debug!(requested = page, clamped, last, "page request clamped");
        }
        Self {
            current_page: clamped,
            ..self
        }
    }

    /// Steps from the clamped page, so a page left stale by a shrink still moves.
    pub fn next(self, total_items: usize) -> Self {
        let current = self.clamped(total_items).current_page;
        self.go_to(current.saturating_add(1), total_items)
    }

    pub fn previous(self, total_items: usize) -> Self {
        let current = self.clamped(total_items).current_page;
        self.go_to(current.saturating_sub(1), total_items)
    }

    /// Re-clamps after the collection changed size.
    pub fn clamped(self, total_items: usize) -> Self {
        self.go_to(self.current_page, total_items)
    }

    pub fn first(self) -> Self {
        Self {
            current_page: 1,
            ..self
        }
    }

    /// Changing the page size always returns to the first page.
    pub fn with_items_per_page(self, items_per_page: usize) -> Self {
        Self::new(items_per_page)
    }

    pub fn has_next(&self, total_items: usize) -> bool {
        self.current_page < self.total_pages(total_items)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<U> {
    pub items: Vec<U>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slices `items` at the (clamped) position of `page`.
pub fn paginate<U: Clone>(items: &[U], page: PageState) -> Page<U> {
    let page = page.clamped(items.len());
    let start = (page.current_page - 1) * page.items_per_page;
    let end = start.saturating_add(page.items_per_page).min(items.len());
    let slice = items.get(start..end).unwrap_or_default();

    Page {
        items: slice.to_vec(),
        current_page: page.current_page,
        total_pages: page.total_pages(items.len()),
        total_items: items.len(),
    }
}
