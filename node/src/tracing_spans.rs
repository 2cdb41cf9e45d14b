//! Pre-built [`tracing::Span`] constructors for common node operations.
//!
//! Using consistent span names and field sets across the codebase makes it
//! easy to filter, search, and correlate traces.

use tracing::{info_span, Span};

use dpos_types::BlockHeader;

/// Span covering the application of a single block. The engine nests its
/// own `maintenance` span inside it when the block crosses a boundary.
pub fn block_apply_span(block: &BlockHeader) -> Span {
    info_span!(
        "block_apply",
        number = block.number,
        timestamp = %block.timestamp,
        hash = %block.hash
    )
}

/// Span covering genesis bootstrap of a fresh store.
pub fn genesis_span(witnesses: usize) -> Span {
    info_span!("genesis", witnesses)
}
