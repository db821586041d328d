use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 50;

/// Page coordinates after flooring/clamping. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Builds a page request from raw query values; anything unparseable uses the default.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let defaults = Self::default();
        Self::new(
            parse_or(page, defaults.page),
            parse_or(limit, defaults.limit),
        )
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.limit - 1) / self.limit
    }
}

fn parse_or(raw: Option<&str>, fallback: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PageDto<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            total_pages: request.total_pages(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_page_and_clamps_limit() {
        let request = PageRequest::new(0, 500);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, MAX_PAGE_LIMIT);

        let request = PageRequest::new(-3, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 1);
    }

    #[test]
    fn unparseable_query_values_use_defaults() {
        let request = PageRequest::from_query(Some("abc"), Some(""));
        assert_eq!(request, PageRequest::default());

        let request = PageRequest::from_query(Some(" 3 "), Some("20"));
        assert_eq!(request, PageRequest { page: 3, limit: 20 });
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(4, 25).offset(), 75);
    }

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest::new(1, 10);
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.total_pages(10), 1);
        assert_eq!(request.total_pages(11), 2);
    }

    #[test]
    fn page_dto_uses_camel_case_keys() {
        let dto = PageDto::new(vec![1, 2], PageRequest::new(1, 2), 3);
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["items"], serde_json::json!([1, 2]));
    }
}
