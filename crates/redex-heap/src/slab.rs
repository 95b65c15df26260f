//! The slab: a vector of fixed-shape slots with an intrusive free-list.

use crate::error::{HeapError, HeapResult};
use crate::node::{Addr, Node};
use crate::stats::HeapStats;

/// Initial threshold is deliberately low so small programs exercise the
/// collector at least once; `alloc` doubles it relative to post-collection
/// occupancy thereafter.
const INITIAL_GC_THRESHOLD: i64 = 64;

pub(crate) enum Slot {
    Occupied { node: Node, marked: bool },
    /// Address of the next vacant slot, or `slots.len()` if this is the
    /// tail of the free-list.
    Vacant { next: Addr },
}

/// The node heap. Addresses are stable until the node they name is
/// collected; only GC sweep ever frees a slot.
pub struct Heap {
    pub(crate) slots: Vec<Slot>,
    first_vacant: Addr,
    occupied_count: i64,
    gc_threshold: i64,
    alloc_count: u64,
    free_count: u64,
    gc_count: u64,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            slots: Vec::new(),
            first_vacant: 0,
            occupied_count: 0,
            gc_threshold: INITIAL_GC_THRESHOLD,
            alloc_count: 0,
            free_count: 0,
            gc_count: 0,
        }
    }

    /// Allocate a fresh Occupied slot holding `node`, without ever
    /// triggering GC. Used only during globals-table initialization, before
    /// the operand stack exists to root anything.
    pub fn alloc_nogc(&mut self, node: Node) -> Addr {
        let addr = if self.first_vacant == self.slots.len() as Addr {
            self.slots.push(Slot::Occupied {
                node,
                marked: false,
            });
            let a = self.first_vacant;
            self.first_vacant += 1;
            a
        } else {
            let a = self.first_vacant;
            let next = match self.slots[a as usize] {
                Slot::Vacant { next } => next,
                Slot::Occupied { .. } => {
                    panic!("free-list points at occupied slot {a}: heap corruption")
                }
            };
            self.slots[a as usize] = Slot::Occupied {
                node,
                marked: false,
            };
            self.first_vacant = next;
            a
        };
        self.occupied_count += 1;
        self.alloc_count += 1;
        addr
    }

    /// Allocate `node`, collecting first if occupancy has reached the
    /// adaptive threshold. `roots` must enumerate every currently-rooted
    /// address (typically the operand stack's frame-walk).
    pub fn alloc(&mut self, node: Node, roots: impl IntoIterator<Item = Addr>) -> Addr {
        if self.occupied_count >= self.gc_threshold {
            self.collect(roots);
            self.gc_threshold = self.occupied_count * 2;
        }
        self.alloc_nogc(node)
    }

    /// Release a slot back to the free-list. Only called by GC sweep.
    pub(crate) fn free(&mut self, addr: Addr) {
        self.slots[addr as usize] = Slot::Vacant {
            next: self.first_vacant,
        };
        self.first_vacant = addr;
        self.occupied_count -= 1;
        self.free_count += 1;
    }

    #[inline]
    pub fn node_at(&self, addr: Addr) -> &Node {
        match self.slots.get(addr as usize) {
            Some(Slot::Occupied { node, .. }) => node,
            _ => panic!("dereference of invalid address {addr}"),
        }
    }

    #[inline]
    pub fn node_at_mut(&mut self, addr: Addr) -> &mut Node {
        match self.slots.get_mut(addr as usize) {
            Some(Slot::Occupied { node, .. }) => node,
            _ => panic!("dereference of invalid address {addr}"),
        }
    }

    /// Replace the node at `addr` wholesale (used by `update` to turn a
    /// thunk into an `Ind`, preserving the address).
    pub fn set_node(&mut self, addr: Addr, node: Node) {
        *self.node_at_mut(addr) = node;
    }

    pub fn occupied_count(&self) -> i64 {
        self.occupied_count
    }

    pub fn gc_threshold(&self) -> i64 {
        self.gc_threshold
    }

    pub fn gc_count(&self) -> u64 {
        self.gc_count
    }

    pub(crate) fn bump_gc_count(&mut self) {
        self.gc_count += 1;
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            alloc_count: self.alloc_count,
            free_count: self.free_count,
            size: self.slots.len() as i64,
            capacity: self.slots.capacity() as i64,
            occupied: self.occupied_count,
            gc_count: self.gc_count,
            gc_threshold: self.gc_threshold,
        }
    }

    /// Iterate all currently Occupied slots (used by sweep and by tests
    /// asserting slab integrity).
    pub fn iter_occupied(&self) -> impl Iterator<Item = (Addr, &Node)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| match s {
            Slot::Occupied { node, .. } => Some((i as Addr, node)),
            Slot::Vacant { .. } => None,
        })
    }

    /// Walk the free-list checking it is acyclic and only touches Vacant
    /// slots (I1). Intended for tests and debug assertions, not the hot
    /// path — this is O(size) and does a full visited-set allocation.
    pub fn validate(&self) -> HeapResult<()> {
        let mut visited = vec![false; self.slots.len()];
        let mut cur = self.first_vacant;
        while cur != self.slots.len() as Addr {
            let idx = cur as usize;
            if idx >= visited.len() || visited[idx] {
                return Err(HeapError::FreeListCorrupt(cur));
            }
            visited[idx] = true;
            match self.slots[idx] {
                Slot::Vacant { next } => cur = next,
                Slot::Occupied { .. } => return Err(HeapError::FreeListCorrupt(cur)),
            }
        }
        Ok(())
    }

    /// Consume the heap, dropping every occupied slot's owned buffers.
    /// Provided for symmetry with the C original's explicit teardown; Rust's
    /// `Drop` already does this, so this is just an explicit name for it.
    pub fn destroy(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_nogc_reuses_freed_slots() {
        let mut heap = Heap::new();
        let a = heap.alloc_nogc(Node::Int { value: 1 });
        let _b = heap.alloc_nogc(Node::Int { value: 2 });
        heap.free(a);
        let c = heap.alloc_nogc(Node::Int { value: 3 });
        assert_eq!(c, a, "freed slot should be recycled before growing the slab");
        heap.validate().unwrap();
    }

    #[test]
    fn addresses_are_stable_across_unrelated_allocation() {
        let mut heap = Heap::new();
        let a = heap.alloc_nogc(Node::Int { value: 7 });
        for i in 0..10 {
            heap.alloc_nogc(Node::Int { value: i });
        }
        assert_eq!(heap.node_at(a).as_int(), Some(7));
    }

    #[test]
    fn alloc_triggers_collect_past_threshold() {
        let mut heap = Heap::new();
        // Nothing is rooted, so every allocation past the threshold should
        // be immediately reclaimable.
        for i in 0..(INITIAL_GC_THRESHOLD * 2) {
            heap.alloc(Node::Int { value: i as i32 }, std::iter::empty());
        }
        assert!(heap.gc_count() >= 1);
        assert!(heap.occupied_count() < INITIAL_GC_THRESHOLD);
        heap.validate().unwrap();
    }

    #[test]
    fn global_nodes_survive_collection_even_when_unrooted() {
        let mut heap = Heap::new();
        let code = crate::node::CodeRef(0);
        let g = heap.alloc_nogc(Node::Global { arity: 1, code });
        heap.collect(std::iter::empty());
        assert!(matches!(heap.node_at(g), Node::Global { .. }));
    }

    #[test]
    fn validate_detects_acyclic_vacant_free_list() {
        let mut heap = Heap::new();
        let a = heap.alloc_nogc(Node::Int { value: 1 });
        let b = heap.alloc_nogc(Node::Int { value: 2 });
        heap.free(a);
        heap.free(b);
        heap.validate().unwrap();
    }
}
