use serde::Serialize;

/// Page metadata for a listing. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    /// `total_pages` is `ceil(total / page_size)` and may be 0.
    pub fn new(page: usize, page_size: usize, total_records: usize) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_records.div_ceil(page_size)
        };
        Self {
            current_page: page,
            page_size,
            total_pages,
            total_records,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    /// Index range of this page, clamped to the collection. Out-of-range pages
    /// (including page 0) give an empty range.
    pub fn bounds(&self) -> std::ops::Range<usize> {
        let Some(start) = self
            .current_page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(self.page_size))
        else {
            return 0..0;
        };
        let start = start.min(self.total_records);
        let end = start.saturating_add(self.page_size).min(self.total_records);
        start..end
    }

    /// Up to `max_visible` page numbers centred on the current page, shifted
    /// to stay within `1..=total_pages`.
    pub fn page_window(&self, max_visible: usize) -> std::ops::RangeInclusive<usize> {
        if max_visible == 0 || self.total_pages == 0 {
            return 1..=0;
        }
        let mut start = self.current_page.saturating_sub(max_visible / 2).max(1);
        let end = self
            .total_pages
            .min(start.saturating_add(max_visible - 1));
        if end + 1 < start + max_visible {
            start = (end + 1).saturating_sub(max_visible).max(1);
        }
        start..=end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.bounds()]
    }
}
