//! Page-number windows for list views.

use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Offset/limit requested from a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Saturates at `i64::MAX` for page numbers far past the last row.
    pub fn offset(&self) -> i64 {
        let skipped = (self.page.max(1) - 1).saturating_mul(self.per_page);
        i64::try_from(skipped).unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

/// Builds the list of page links shown under a table; `None` marks a gap.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let current_page = current_page.min(last_page);
    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    /// Wraps one page of `items` out of `total` rows split into `per_page` chunks.
    pub fn new(items: Vec<T>, current_page: usize, total: usize, per_page: usize) -> Self {
        let current_page = current_page.max(1);
        let total_pages = total.div_ceil(per_page.max(1));

        Self {
            items,
            pages: get_pages(total_pages, current_page, 2, 2, 4, 2),
            page: current_page,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pages: self.pages,
            page: self.page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pages_for_empty_result() {
        let page: Paginated<u8> = Paginated::new(vec![], 1, 0, 20);
        assert!(page.pages.is_empty());
        assert_eq!(page.page, 1);
    }

    #[test]
    fn short_lists_have_no_gaps() {
        let page: Paginated<u8> = Paginated::new(vec![], 2, 45, 20);
        assert_eq!(page.pages, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn long_lists_collapse_into_gaps() {
        let page: Paginated<u8> = Paginated::new(vec![], 10, 400, 20);
        assert_eq!(
            page.pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let page: Paginated<u8> = Paginated::new(vec![], 0, 10, 20);
        assert_eq!(page.page, 1);
        assert_eq!(Pagination::new(0, 20).offset(), 0);
        assert_eq!(Pagination::new(3, 20).offset(), 40);
    }

    #[test]
    fn huge_page_numbers_saturate() {
        let pagination = Pagination::new(usize::MAX, 20);
        assert_eq!(pagination.offset(), i64::MAX);
        assert_eq!(pagination.limit(), 20);

        let page: Paginated<u8> = Paginated::new(vec![], usize::MAX, 400, 20);
        assert_eq!(page.page, usize::MAX);
        assert_eq!(
            page.pages,
            vec![Some(1), Some(2), None, Some(18), Some(19), Some(20)]
        );
    }
}
