use serde::Serialize;

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    /// Page numbers a pager shows around the current one.
    pub visible_pages: Vec<usize>,
}

/// Slice `items` into 1-based page `page` of `per_page` entries.
///
/// There is always at least one (possibly empty) page, and `page` is
/// clamped into range rather than producing an error.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total);
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    let first_visible = page.saturating_sub(1).max(1);
    let last_visible = (page + 1).min(total_pages);

    Page {
        items,
        page,
        per_page,
        total,
        total_pages,
        visible_pages: (first_visible..=last_visible).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 2, 10);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.visible_pages, vec![1, 2, 3]);
    }

    #[test]
    fn test_last_partial_page_and_window() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.items, (21..=25).collect::<Vec<_>>());
        assert_eq!(page.visible_pages, vec![2, 3]);

        let first = paginate(&items, 1, 5);
        assert_eq!(first.visible_pages, vec![1, 2]);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let items: Vec<u32> = (1..=4).collect();
        assert_eq!(paginate(&items, 9, 3).page, 2);
        assert_eq!(paginate(&items, 9, 3).items, vec![4]);
        assert_eq!(paginate(&items, 0, 3).page, 1);
    }

    #[test]
    fn test_empty_input_has_one_empty_page() {
        let page = paginate::<u32>(&[], 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.visible_pages, vec![1]);
    }

    #[test]
    fn test_zero_per_page_is_treated_as_one() {
        let page = paginate(&["a", "b"], 2, 0);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.items, vec!["b"]);
    }
}
