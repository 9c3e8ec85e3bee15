use serde::Serialize;

/// Pagination metadata returned alongside every windowed result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl PageMeta {
    /// `limit` is already bounded to `[1, MAX_LIMIT]` by the descriptor, so
    /// the division is never by zero.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit as u64),
        }
    }
}

/// Offset of the requested window. A page beyond the last one simply lands
/// past the end of the relation and yields an empty item list.
pub fn offset(page: u32, limit: u32) -> i64 {
    (page as i64 - 1) * limit as i64
}
