use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// One-based page selection for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Clamps raw query values into a usable request.
    pub fn new(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> Self {
        let per_page = per_page
            .unwrap_or(default_per_page)
            .clamp(1, MAX_PAGE_SIZE);
        Self {
            page: page.unwrap_or(1).max(1),
            per_page,
        }
    }

    fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.per_page as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn paginate(items: Vec<T>, request: &PageRequest) -> Self {
        let total = items.len();
        let per_page = request.per_page.max(1);
        let total_pages = total.div_ceil(per_page as usize) as u32;
        let items = items
            .into_iter()
            .skip(request.offset())
            .take(per_page as usize)
            .collect();

        Self {
            items,
            total,
            page: request.page.max(1),
            per_page,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_clamps_out_of_range_values() {
        let request = PageRequest::new(Some(0), Some(5_000), DEFAULT_PAGE_SIZE);
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, MAX_PAGE_SIZE);

        let request = PageRequest::new(None, Some(0), DEFAULT_PAGE_SIZE);
        assert_eq!(request.per_page, 1);
    }

    #[test]
    fn paginate_slices_and_counts_pages() {
        let request = PageRequest::new(Some(2), Some(3), DEFAULT_PAGE_SIZE);
        let page = Page::paginate((1..=7).collect::<Vec<_>>(), &request);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_totals() {
        let request = PageRequest::new(Some(9), Some(5), DEFAULT_PAGE_SIZE);
        let page = Page::paginate(vec!["a", "b"], &request);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 9);
    }
}
