//! Slab and collector statistics, reported by the entry harness at exit.

/// Snapshot of the heap's allocation and collection counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    /// Total slots ever allocated (across the whole run).
    pub alloc_count: u64,
    /// Total slots ever freed (across the whole run).
    pub free_count: u64,
    /// Current slab length (occupied + vacant, i.e. high-water mark).
    pub size: i64,
    /// Current backing-array capacity.
    pub capacity: i64,
    /// Number of slots currently Occupied.
    pub occupied: i64,
    /// Number of completed `collect()` cycles.
    pub gc_count: u64,
    /// Occupancy at (or above) which the next `alloc` triggers a collection.
    pub gc_threshold: i64,
}
