use serde::Deserialize;

/// Upper bound on documents returned by a single listing call.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// `?skip=&limit=` query parameters shared by the listing endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn new(skip: u64, limit: i64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    /// Resolve to `(skip, limit)`, clamping the limit to `1..=MAX_PAGE_SIZE`.
    pub fn resolve(&self, default_limit: i64) -> (u64, i64) {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        (skip, limit)
    }
}
