use crate::types::PageInfo;

const DEFAULT_PAGE_SIZE: usize = 50;

/// Parameters for the next page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub first: usize,
    pub after: Option<String>,
}

/// Cursor pagination state for one list view.
///
/// Moves from fresh (no cursor) through has-more to exhausted once the
/// server reports no next page. [`Paginator::reset`] returns to fresh.
/// Updates must be applied in the order their fetches were issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    cursor: String,
    page_size: usize,
    total_loaded: usize,
    has_next_page: bool,
}

impl Paginator {
    /// Non-positive page sizes fall back to 50.
    pub fn new(page_size: i64) -> Self {
        let page_size = usize::try_from(page_size)
            .ok()
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            cursor: String::new(),
            page_size,
            total_loaded: 0,
            has_next_page: true,
        }
    }

    pub fn next_page_request(&self) -> Option<PageRequest> {
        if !self.has_next_page {
            return None;
        }
        Some(PageRequest {
            first: self.page_size,
            after: (!self.cursor.is_empty()).then(|| self.cursor.clone()),
        })
    }

    pub fn update(&mut self, page_info: &PageInfo, count: usize) {
        self.has_next_page = page_info.has_next_page;
        self.cursor = page_info.end_cursor.clone();
        self.total_loaded += count;
    }

    pub fn reset(&mut self) {
        self.cursor.clear();
        self.total_loaded = 0;
        self.has_next_page = true;
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn total_loaded(&self) -> usize {
        self.total_loaded
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
