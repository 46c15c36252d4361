//! Pagination module
//!
//! Translates caller pagination (`page` or `offset`, plus `limit`) into the
//! fixed-size chunks the upstream serves, and back into a caller-sized page.
//!
//! # Overview
//!
//! ```text
//! PaginationRequest ──normalize──▶ CanonicalWindow ──plan_window──▶ [UpstreamPageRef]
//!                                        │                               │ (fetch)
//!                                        │                               ▼
//!                                        └────────assemble_window◀── chunks
//! ```
//!
//! Every function here is pure; the fetch between planning and assembly
//! belongs to [`crate::client`].

mod mapper;
mod metadata;
mod normalize;
mod slicer;
mod types;

pub use mapper::{map_offset, plan_window, UpstreamPageRef};
pub use metadata::{calculate_metadata, PaginationMetadata};
pub use normalize::normalize;
pub use slicer::{assemble_window, slice_chunk};
pub use types::{CanonicalWindow, PageLimits, PaginationRequest};
