use crate::{ItemsRequest, SortKey};

/// Page-oriented view over the windowing model.
///
/// The total item count is learned from fetch results (see
/// [`PaginationState::set_total_item_count`]); until then the last page is unknown and page
/// changes are not clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaginationState {
    items_per_page: usize,
    current_page_index: usize,
    total_item_count: Option<usize>,
}

impl PaginationState {
    pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

    /// `items_per_page` is clamped to at least 1.
    pub fn new(items_per_page: usize) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
            current_page_index: 0,
            total_item_count: None,
        }
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn total_item_count(&self) -> Option<usize> {
        self.total_item_count
    }

    /// `None` until a total is known. An empty result set has a single (empty) page 0.
    pub fn last_page_index(&self) -> Option<usize> {
        let total = self.total_item_count?;
        Some(total.saturating_sub(1) / self.items_per_page)
    }

    /// Moves to `page_index`, clamped to the last known page.
    ///
    /// Returns `true` when the current page changed.
    pub fn set_current_page_index(&mut self, page_index: usize) -> bool {
        let next = match self.last_page_index() {
            Some(last) => page_index.min(last),
            None => page_index,
        };
        let changed = next != self.current_page_index;
        self.current_page_index = next;
        changed
    }

    /// Records a newly learned total. If the current page no longer exists, it is clamped to
    /// the new last page.
    ///
    /// Returns `true` when the current page changed.
    pub fn set_total_item_count(&mut self, total_item_count: usize) -> bool {
        self.total_item_count = Some(total_item_count);
        let last = total_item_count.saturating_sub(1) / self.items_per_page;
        if self.current_page_index > last {
            dwdebug!(
                from = self.current_page_index,
                to = last,
                total_item_count,
                "pagination: clamping current page"
            );
            self.current_page_index = last;
            return true;
        }
        false
    }

    /// Changes the page size, keeping the first item of the current page visible.
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        let first = self.start_index();
        self.items_per_page = items_per_page.max(1);
        self.current_page_index = first / self.items_per_page;
    }

    pub fn start_index(&self) -> usize {
        self.current_page_index.saturating_mul(self.items_per_page)
    }

    /// A request for the current page.
    pub fn request(&self, sort_keys: Vec<SortKey>) -> ItemsRequest {
        ItemsRequest::new(self.start_index(), Some(self.items_per_page)).with_sort_keys(sort_keys)
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ITEMS_PER_PAGE)
    }
}
