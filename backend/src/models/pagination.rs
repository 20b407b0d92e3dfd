use serde::{Deserialize, Serialize};

/// One page of a larger ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    /// Cut page `page` (1-based) of size `limit` out of an already ordered list.
    pub fn from_ordered(all: Vec<T>, page: usize, limit: usize) -> Self {
        let total = all.len();
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self {
            items,
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// `ceil(total / limit)`; zero when `limit` is zero.
pub fn total_pages(total: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(5, 1), 5);
        assert_eq!(total_pages(2, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn test_from_ordered_slices_requested_page() {
        let page = Paginated::from_ordered((1..=7).collect::<Vec<_>>(), 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);

        let past_end = Paginated::from_ordered((1..=7).collect::<Vec<_>>(), 4, 3);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 7);
    }
}
