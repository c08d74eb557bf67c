use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 6;

/// One page of a filtered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into `[1, total_pages]`.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice `items` into the requested 1-based page. Out-of-range pages are
/// clamped; a zero page size falls back to [`DEFAULT_PAGE_SIZE`].
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 { DEFAULT_PAGE_SIZE } else { per_page };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_pages() {
        let items: Vec<u32> = (1..=14).collect();

        let first = paginate(&items, 1, 6);
        assert_eq!(first.items, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(first.total_pages, 3);

        let last = paginate(&items, 3, 6);
        assert_eq!(last.items, vec![13, 14]);
    }

    #[test]
    fn clamps_page_into_range() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(&items, 0, 6).page, 1);
        let beyond = paginate(&items, 99, 6);
        assert_eq!(beyond.page, 2);
        assert_eq!(beyond.items, vec![7]);
    }

    #[test]
    fn empty_collection_has_no_pages() {
        let page = paginate::<u32>(&[], 4, 6);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }
}
