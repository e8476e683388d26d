//! Page/limit handling shared by every list endpoint

/// Page used when the client sends nothing usable
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client sends nothing usable
pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound on page size
pub const MAX_LIMIT: u32 = 100;

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Build from raw query-string values.
    ///
    /// Only the leading integer of each value counts, so `"2abc"` and `"2.5"`
    /// both read as 2. Missing, non-numeric and zero values fall back to the
    /// defaults.
    /// A negative page becomes page 1, and the limit is clamped to
    /// `1..=MAX_LIMIT`.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_nonzero(page).map_or(DEFAULT_PAGE, |p| clamp_u32(p, 1, u32::MAX));
        let limit = parse_nonzero(limit).map_or(DEFAULT_LIMIT, |l| clamp_u32(l, 1, MAX_LIMIT));
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items before this page
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn parse_nonzero(raw: Option<&str>) -> Option<i64> {
    raw.and_then(leading_int).filter(|n| *n != 0)
}

/// Optional sign and leading ASCII digits, ignoring whatever follows
fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn clamp_u32(n: i64, min: u32, max: u32) -> u32 {
    n.clamp(i64::from(min), i64::from(max)) as u32
}

/// Pagination metadata returned with every page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u64,
    pub total: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit));
        Self {
            current_page: request.page,
            total_pages,
            total,
            has_next_page: u64::from(request.page) < total_pages,
            has_prev_page: request.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_or_garbage() {
        assert_eq!(PageRequest::from_raw(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::from_raw(Some("abc"), Some("")),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::from_raw(Some("0"), Some("0")),
            PageRequest::default()
        );
    }

    #[test]
    fn test_leading_digits() {
        let req = PageRequest::from_raw(Some("2abc"), Some("2.5"));
        assert_eq!(req.page(), 2);
        assert_eq!(req.limit(), 2);

        let req = PageRequest::from_raw(Some(" 3 "), Some("+20"));
        assert_eq!(req.page(), 3);
        assert_eq!(req.limit(), 20);

        assert_eq!(
            PageRequest::from_raw(Some("abc2"), Some("-")),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::from_raw(Some("99999999999999999999999"), None).page(),
            u32::MAX
        );
    }

    #[test]
    fn test_clamping() {
        let req = PageRequest::from_raw(Some("-3"), Some("1000"));
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), MAX_LIMIT);

        let req = PageRequest::from_raw(Some("2"), Some("-5"));
        assert_eq!(req.limit(), 1);
    }

    #[test]
    fn test_skip() {
        assert_eq!(PageRequest::new(1, 10).skip(), 0);
        assert_eq!(PageRequest::new(3, 7).skip(), 14);
    }

    #[test]
    fn test_page_info() {
        let info = PageInfo::new(PageRequest::new(1, 10), 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next_page);
        assert!(!info.has_prev_page);

        let info = PageInfo::new(PageRequest::new(3, 10), 25);
        assert!(!info.has_next_page);
        assert!(info.has_prev_page);

        let info = PageInfo::new(PageRequest::new(1, 10), 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next_page);
    }

    #[test]
    fn test_exact_multiple() {
        let info = PageInfo::new(PageRequest::new(2, 5), 10);
        assert_eq!(info.total_pages, 2);
        assert!(!info.has_next_page);
    }
}
