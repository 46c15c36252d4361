//! Upstream page mapper
//!
//! The upstream only serves fixed-size chunks addressed by a 1-based page
//! number. These functions locate the chunk(s) holding a caller window.

use super::types::CanonicalWindow;

/// One upstream chunk: its 1-based page number and the global index of its first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamPageRef {
    pub api_page: u64,
    pub api_offset: u64,
}

/// Locate the chunk containing `offset`.
///
/// Always `api_offset <= offset < api_offset + chunk_size`.
pub fn map_offset(offset: u64, chunk_size: u64) -> UpstreamPageRef {
    let chunk_size = chunk_size.max(1);
    let index = offset / chunk_size;
    UpstreamPageRef {
        api_page: index + 1,
        api_offset: index * chunk_size,
    }
}

/// Every chunk overlapping `[window.offset, window.offset + window.limit)`, in order.
///
/// A window that straddles a chunk boundary yields two refs; callers fetch
/// both and concatenate with [`super::assemble_window`].
pub fn plan_window(window: &CanonicalWindow, chunk_size: u64) -> Vec<UpstreamPageRef> {
    let chunk_size = chunk_size.max(1);
    let first = map_offset(window.offset, chunk_size);
    let last = map_offset(window.end().saturating_sub(1).max(window.offset), chunk_size);
    (first.api_page..=last.api_page)
        .map(|api_page| UpstreamPageRef {
            api_page,
            api_offset: (api_page - 1) * chunk_size,
        })
        .collect()
}
