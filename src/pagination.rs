//! Page-link windows for paged customer listings.

use serde::Serialize;

/// Listings with at most this many pages show every page link.
pub const MAX_PAGES_SHOWN: usize = 7;

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

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

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

/// 1-based page links around `current_page`; `None` marks an ellipsis.
///
/// The first and last pages are always present together with the pages
/// adjacent to the current one.
pub fn page_links(current_page: usize, total_pages: usize) -> Vec<Option<usize>> {
    if total_pages <= MAX_PAGES_SHOWN {
        return (1..=total_pages).map(Some).collect();
    }
    let current_page = current_page.clamp(1, total_pages);
    get_pages(total_pages, current_page, 1, 1, 1, 1)
}

/// One rendered page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total: usize, total_pages: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        Self {
            items,
            pages: page_links(current_page, total_pages),
            page: current_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_pages_are_listed_in_full() {
        assert_eq!(page_links(1, 0), Vec::<Option<usize>>::new());
        assert_eq!(page_links(3, 5), (1..=5).map(Some).collect::<Vec<_>>());
        assert_eq!(page_links(7, 7).len(), 7);
    }

    #[test]
    fn window_in_the_middle_has_two_ellipses() {
        assert_eq!(
            page_links(5, 10),
            vec![Some(1), None, Some(4), Some(5), Some(6), None, Some(10)]
        );
    }

    #[test]
    fn window_at_the_edges() {
        assert_eq!(
            page_links(1, 10),
            vec![Some(1), Some(2), None, Some(10)]
        );
        assert_eq!(
            page_links(2, 10),
            vec![Some(1), Some(2), Some(3), None, Some(10)]
        );
        assert_eq!(
            page_links(9, 10),
            vec![Some(1), None, Some(8), Some(9), Some(10)]
        );
        assert_eq!(
            page_links(10, 10),
            vec![Some(1), None, Some(9), Some(10)]
        );
    }

    #[test]
    fn paginated_defaults_zero_page_to_first() {
        let page = Paginated::new(vec![1, 2], 0, 12, 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, vec![Some(1), Some(2)]);
    }
}
