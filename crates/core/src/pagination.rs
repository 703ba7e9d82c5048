//! Client-side pagination over in-memory lists.
//!
//! [`Pagination`] tracks the current page of a list whose items are already loaded. All
//! navigation clamps into `[1, max(total_pages, 1)]` and never fails. Changing the item count
//! keeps the current page in range but does not go back to page 1; callers that replace the
//! underlying data call [`Pagination::reset`] themselves.
//!
//! [`page_markers`] produces the page-number strip rendered under a table, collapsing long
//! runs into [`PageMarker::Ellipsis`].

use crate::constants::{ELLIPSIS, MAX_VISIBLE_PAGES};
use crate::{CoreError, CoreResult};
use std::fmt;

/// One entry of the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageMarker::Page(n) => write!(f, "{n}"),
            PageMarker::Ellipsis => f.write_str(ELLIPSIS),
        }
    }
}

/// Builds the page-number strip for `current_page` out of `total_pages`.
///
/// Up to [`MAX_VISIBLE_PAGES`] pages are all listed. Beyond that the strip always holds the
/// first and last page, the neighbours of the current page, and an ellipsis on each side that
/// hides pages.
pub fn page_markers(current_page: usize, total_pages: usize) -> Vec<PageMarker> {
    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(PageMarker::Page).collect();
    }

    let mut markers = vec![PageMarker::Page(1)];

    if current_page > 4 {
        markers.push(PageMarker::Ellipsis);
    }

    let start = current_page.saturating_sub(1).max(2);
    let end = (current_page + 1).min(total_pages - 1);
    markers.extend(
        (start..=end)
            .filter(|&page| page != 1 && page != total_pages)
            .map(PageMarker::Page),
    );

    if current_page + 3 < total_pages {
        markers.push(PageMarker::Ellipsis);
    }

    markers.push(PageMarker::Page(total_pages));
    markers
}

/// Summary line for a list view ("Showing 11 to 20 of 42").
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub start_index: usize,
    pub end_index: usize,
    pub total_items: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    items_per_page: usize,
    total_items: usize,
}

impl Pagination {
    /// Creates a pager positioned on page 1.
    ///
    /// # Arguments
    ///
    /// * `total_items` - Number of items across all pages.
    /// * `items_per_page` - Page size.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if `items_per_page` is zero.
    pub fn new(total_items: usize, items_per_page: usize) -> CoreResult<Self> {
        if items_per_page == 0 {
            return Err(CoreError::InvalidInput(
                "items_per_page must be greater than zero".into(),
            ));
        }
        Ok(Self {
            current_page: 1,
            items_per_page,
            total_items,
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// `ceil(total_items / items_per_page)`; zero for an empty list.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page)
    }

    /// Pagers with a single page (or none) need no controls.
    pub fn needs_controls(&self) -> bool {
        self.total_pages() > 1
    }

    fn last_page(&self) -> usize {
        self.total_pages().max(1)
    }

    /// Moves to `page`, clamped into `[1, total_pages]`. An empty list stays on page 1.
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.last_page());
    }

    /// Advances one page; a no-op on the last page.
    pub fn next_page(&mut self) {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
        }
    }

    /// Steps back one page; a no-op on page 1.
    pub fn previous_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn go_to_first_page(&mut self) {
        self.current_page = 1;
    }

    /// Page 1 when there are no items.
    pub fn go_to_last_page(&mut self) {
        self.current_page = self.last_page();
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Replaces the item count, pulling the current page back if the list shrank below it.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.current_page = self.current_page.min(self.last_page());
    }

    /// Changes the page size, keeping the current page when it still exists.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if `items_per_page` is zero; the pager is left unchanged.
    pub fn set_items_per_page(&mut self, items_per_page: usize) -> CoreResult<()> {
        if items_per_page == 0 {
            return Err(CoreError::InvalidInput(
                "items_per_page must be greater than zero".into(),
            ));
        }
        self.items_per_page = items_per_page;
        self.current_page = self.current_page.min(self.last_page());
        Ok(())
    }

    /// The items visible on the current page. Empty when the page lies past the data.
    pub fn slice<'a, T>(&self, data: &'a [T]) -> &'a [T] {
        let start = (self.current_page - 1).saturating_mul(self.items_per_page);
        if start >= data.len() {
            return &[];
        }
        let end = start.saturating_add(self.items_per_page).min(data.len());
        &data[start..end]
    }

    pub fn info(&self) -> PaginationInfo {
        let total_pages = self.total_pages();
        PaginationInfo {
            start_index: (self.current_page - 1) * self.items_per_page + 1,
            end_index: (self.current_page * self.items_per_page).min(self.total_items),
            total_items: self.total_items,
            current_page: self.current_page,
            total_pages,
            has_next_page: self.current_page < total_pages,
            has_previous_page: self.current_page > 1,
        }
    }

    /// Contiguous run of at most `max_visible` page numbers around the current page, shifted
    /// so that it stays inside `[1, total_pages]`. Used by compact pagers without ellipses.
    pub fn page_window(&self, max_visible: usize) -> Vec<usize> {
        let total_pages = self.total_pages();
        let half = max_visible / 2;

        let mut start = self.current_page.saturating_sub(half).max(1);
        let mut end = (self.current_page + half).min(total_pages);

        if self.current_page <= half {
            end = max_visible.min(total_pages);
        }
        if self.current_page + half >= total_pages {
            start = (total_pages + 1).saturating_sub(max_visible).max(1);
        }

        (start..=end).collect()
    }

    pub fn markers(&self) -> Vec<PageMarker> {
        page_markers(self.current_page, self.total_pages())
    }
}
