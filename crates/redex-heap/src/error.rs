//! Heap errors.
//!
//! Invalid-address dereferences are malformed-graph conditions per the
//! reducer's contract (the compiler emitting globals' code bodies is
//! assumed well-typed) and panic directly at the dereference site
//! (`Heap::node_at`/`node_at_mut`) rather than flowing through here —
//! this type is reserved for conditions a well-typed program can still
//! hit at runtime.

use thiserror::Error;

/// Errors that can occur while allocating from the slab.
#[derive(Debug, Error)]
pub enum HeapError {
    /// The slab's backing array could not grow (allocator exhaustion). Not
    /// currently constructed in this implementation — a true backing-`Vec`
    /// OOM aborts the process before this check could observe it — but the
    /// variant documents the contract as typed for whichever growth
    /// strategy eventually needs to surface it.
    #[error("slab failed to grow past capacity {0}")]
    AllocationFailure(i64),

    /// A vacant slot was found on the free-list more than once, or an
    /// occupied slot was found on the free-list — indicates heap corruption.
    #[error("slab free-list corruption at slot {0}")]
    FreeListCorrupt(i64),
}

/// Result type for heap operations.
pub type HeapResult<T> = std::result::Result<T, HeapError>;
