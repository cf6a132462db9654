use serde::{Deserialize, Serialize};

pub(crate) const fn default_limit() -> i64 {
    100
}

/// Standard `?skip=&limit=` query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

impl PageQuery {
    /// Clamps to sane bounds so a caller cannot request negative offsets
    /// or unbounded result sets.
    pub(crate) fn clamped(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(1, 500))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

#[cfg(test)]
mod tests {
    use super::PageQuery;

    #[test]
    fn clamped_bounds() {
        let q = PageQuery { skip: -5, limit: 10_000 };
        assert_eq!(q.clamped(), (0, 500));
        let q = PageQuery { skip: 20, limit: 0 };
        assert_eq!(q.clamped(), (20, 1));
    }
}
