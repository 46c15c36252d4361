//! Page slicer
//!
//! Cuts the caller's window out of one or more fetched upstream chunks.

use super::types::CanonicalWindow;

/// The part of `chunk` that falls inside the caller's window.
///
/// `chunk_api_offset` is the global index of `chunk[0]`. Never panics; returns
/// an empty slice when the window starts past the end of the chunk.
pub fn slice_chunk<T>(
    chunk: &[T],
    caller_offset: u64,
    caller_limit: u64,
    chunk_api_offset: u64,
) -> &[T] {
    let start = usize::try_from(caller_offset.saturating_sub(chunk_api_offset))
        .unwrap_or(usize::MAX)
        .min(chunk.len());
    let limit = usize::try_from(caller_limit).unwrap_or(usize::MAX);
    let end = start.saturating_add(limit).min(chunk.len());
    &chunk[start..end]
}

/// Concatenate the window's records across consecutive chunks.
///
/// `chunks` yields `(api_offset, records)` pairs in upstream order. Only
/// records whose global index lies in `[window.offset, window.end())` are
/// kept, so a short chunk followed by a later one leaves a gap rather than
/// shifting later records into the window.
pub fn assemble_window<'a, T, I>(chunks: I, window: &CanonicalWindow) -> Vec<T>
where
    T: Clone + 'a,
    I: IntoIterator<Item = (u64, &'a [T])>,
{
    let end = window.end();
    let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
    let mut out: Vec<T> = Vec::with_capacity(limit.min(1024));
    for (api_offset, records) in chunks {
        let start = window.offset.max(api_offset);
        if start >= end {
            break;
        }
        out.extend_from_slice(slice_chunk(records, start, end - start, api_offset));
    }
    out
}
