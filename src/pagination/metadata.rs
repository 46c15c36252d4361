//! Navigation metadata returned alongside every page.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMetadata {
    pub total_count: u64,
    pub current_page: u64,
    /// Records actually returned, which may be below the requested limit on the last page.
    pub page_size: u64,
    pub total_pages: u64,
    pub has_more: bool,
    pub next_page: Option<u64>,
}

/// Derive navigation metadata from the upstream total and the served page.
pub fn calculate_metadata(
    total_count: u64,
    current_page: u64,
    limit: u64,
    returned: usize,
) -> PaginationMetadata {
    let total_pages = total_count.div_ceil(limit.max(1));
    let has_more = current_page < total_pages;
    PaginationMetadata {
        total_count,
        current_page,
        page_size: returned as u64,
        total_pages,
        has_more,
        next_page: has_more.then(|| current_page + 1),
    }
}
