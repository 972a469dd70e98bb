use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Requested page window, already clamped to sane bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl PageParams {
    /// Parse raw `page` / `limit` query values. Garbage never fails the
    /// request: non-numeric or non-positive values fall back to the defaults
    /// and oversized limits are capped.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);

        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .map(|l| l.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination descriptor returned alongside a page of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub items_per_page: i64,
}

impl Pagination {
    pub fn new(params: PageParams, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        let total_pages = (total_items + params.limit - 1) / params.limit;
        Self {
            page: params.page,
            limit: params.limit,
            total_items,
            total_pages,
            current_page: params.page,
            items_per_page: params.limit,
        }
    }

    /// Number of rows the page slice holds for this descriptor
    pub fn expected_len(&self) -> i64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.limit);
        self.total_items.saturating_sub(offset).clamp(0, self.limit)
    }

    /// Shape used in list/search response envelopes
    pub fn envelope(&self) -> PaginationEnvelope {
        PaginationEnvelope {
            total_items: self.total_items,
            total_pages: self.total_pages,
            current_page: self.current_page,
            limit: self.items_per_page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationEnvelope {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        let p = PageParams::parse(None, None);
        assert_eq!(p, PageParams { page: 1, limit: 10 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let p = PageParams::parse(Some("abc"), Some("ten"));
        assert_eq!(p, PageParams::default());

        let p = PageParams::parse(Some("0"), Some("-4"));
        assert_eq!(p, PageParams::default());
    }

    #[test]
    fn limit_is_capped() {
        let p = PageParams::parse(Some("2"), Some("500"));
        assert_eq!(p.limit, MAX_LIMIT);
        assert_eq!(p.offset(), 100);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        for limit in [1, 7, 10, 100] {
            for page in [1, 2, 3, 50] {
                let p = PageParams::parse(Some(&page.to_string()), Some(&limit.to_string()));
                assert_eq!(p.offset(), (page - 1) * limit);
            }
        }
    }

    #[test]
    fn empty_table_has_zero_pages() {
        for page in ["1", "3", "999"] {
            let pagination = Pagination::new(PageParams::parse(Some(page), None), 0);
            assert_eq!(pagination.total_pages, 0);
            assert_eq!(pagination.expected_len(), 0);
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams { page: 1, limit: 10 };
        assert_eq!(Pagination::new(params, 10).total_pages, 1);
        assert_eq!(Pagination::new(params, 11).total_pages, 2);
        assert_eq!(Pagination::new(params, 95).total_pages, 10);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let pagination = Pagination::new(PageParams { page: 999, limit: 10 }, 5);
        assert_eq!(pagination.total_pages, 1);
        assert_eq!(pagination.expected_len(), 0);
    }

    #[test]
    fn last_page_is_partial() {
        let pagination = Pagination::new(PageParams { page: 3, limit: 10 }, 25);
        assert_eq!(pagination.expected_len(), 5);
    }

    #[test]
    fn envelope_projects_descriptor() {
        let env = Pagination::new(PageParams { page: 2, limit: 5 }, 12).envelope();
        assert_eq!(env, PaginationEnvelope { total_items: 12, total_pages: 3, current_page: 2, limit: 5 });
    }

    #[test]
    fn huge_page_numbers_hold_no_rows() {
        let params = PageParams::parse(Some("9223372036854775807"), Some("10"));
        assert_eq!(params.offset(), i64::MAX);

        let pagination = Pagination::new(params, 5);
        assert_eq!(pagination.expected_len(), 0);
        assert_eq!(pagination.envelope().current_page, i64::MAX);
    }
}
