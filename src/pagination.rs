use serde::Serialize;

/// Page sizes offered by the list views.
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;
/// Maximum number of numbered page buttons rendered at once.
const WINDOW: usize = 5;

/// Pagination counters as reported by the backend.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct PageState {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl PageState {
    /// Builds the state for `total` rows; `page` is raised to 1 when zero.
    ///
    /// A page past the end is kept as requested so the view shows an empty
    /// page rather than silently jumping.
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let limit = if limit == 0 { DEFAULT_ITEMS_PER_PAGE } else { limit };
        Self {
            page: page.max(1),
            limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Accepts only one of [`PAGE_SIZES`], falling back to the default.
    pub fn normalize_limit(limit: Option<usize>) -> usize {
        limit
            .filter(|l| PAGE_SIZES.contains(l))
            .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
    }

    /// Changing the page size always returns to the first page.
    pub fn with_limit(self, limit: usize) -> Self {
        Self::new(1, limit, self.total)
    }

    pub fn with_page(self, page: usize) -> Self {
        Self::new(page, self.limit, self.total)
    }

    /// Up to five page numbers centred on the current page, clamped to
    /// `1..=total_pages`.
    pub fn window(&self) -> Vec<usize> {
        if self.total_pages == 0 {
            return Vec::new();
        }
        let current = self.page.clamp(1, self.total_pages);
        let span = WINDOW.min(self.total_pages);
        let half = WINDOW / 2;
        let start = current
            .saturating_sub(half)
            .max(1)
            .min(self.total_pages - span + 1);
        (start..start + span).collect()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based index of the first row on this page, 0 when the page has
    /// no rows.
    pub fn first_item(&self) -> usize {
        let offset = (self.page - 1).saturating_mul(self.limit);
        if offset >= self.total { 0 } else { offset + 1 }
    }

    /// 1-based index of the last row on this page, 0 when the page has no rows.
    pub fn last_item(&self) -> usize {
        if self.first_item() == 0 {
            0
        } else {
            self.page.saturating_mul(self.limit).min(self.total)
        }
    }
}

#[derive(Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<usize>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub first_item: usize,
    pub last_item: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, state: PageState) -> Self {
        Self {
            items,
            pages: state.window(),
            page: state.page,
            limit: state.limit,
            total: state.total,
            total_pages: state.total_pages,
            has_previous: state.has_previous(),
            has_next: state.has_next(),
            first_item: state.first_item(),
            last_item: state.last_item(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_centred_and_clamped() {
        let state = PageState::new(1, 10, 100);
        assert_eq!(state.window(), vec![1, 2, 3, 4, 5]);
        assert_eq!(state.with_page(5).window(), vec![3, 4, 5, 6, 7]);
        assert_eq!(state.with_page(10).window(), vec![6, 7, 8, 9, 10]);
        assert_eq!(state.with_page(9).window(), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn window_shrinks_with_few_pages() {
        assert_eq!(PageState::new(2, 10, 25).window(), vec![1, 2, 3]);
        assert!(PageState::new(1, 10, 0).window().is_empty());
    }

    #[test]
    fn window_stays_in_range_past_the_end() {
        let state = PageState::new(12, 10, 30);
        assert_eq!(state.page, 12);
        assert_eq!(state.window(), vec![1, 2, 3]);
        assert!(!state.has_next());
    }

    #[test]
    fn page_size_change_resets_to_first_page() {
        let state = PageState::new(4, 10, 200).with_limit(50);
        assert_eq!(state.page, 1);
        assert_eq!(state.total_pages, 4);
    }

    #[test]
    fn zero_page_is_raised_to_one() {
        assert_eq!(PageState::new(0, 10, 5).page, 1);
    }

    #[test]
    fn only_known_page_sizes_are_accepted() {
        assert_eq!(PageState::normalize_limit(Some(25)), 25);
        assert_eq!(PageState::normalize_limit(Some(7)), DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(PageState::normalize_limit(None), DEFAULT_ITEMS_PER_PAGE);
    }

    #[test]
    fn item_range_of_last_page() {
        let state = PageState::new(3, 10, 23);
        assert_eq!(state.first_item(), 21);
        assert_eq!(state.last_item(), 23);
    }

    #[test]
    fn page_past_the_end_shows_no_rows() {
        let state = PageState::new(12, 10, 30);
        assert_eq!((state.first_item(), state.last_item()), (0, 0));
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let state = PageState::new(usize::MAX, 100, 30);
        assert_eq!(state.page, usize::MAX);
        assert_eq!((state.first_item(), state.last_item()), (0, 0));
        assert_eq!(state.window(), vec![1]);
        assert!(state.has_previous());
        assert!(!state.has_next());
    }
}
