//! Mark-sweep collection over the slab.
//!
//! `Global` nodes are immortal: marking never descends into one (they're
//! closed over compiled code, not graph structure worth tracing) and sweep
//! never frees one regardless of its mark bit.

use crate::node::{Addr, Node};
use crate::slab::{Heap, Slot};

impl Heap {
    /// Mark every node transitively reachable from `roots`, then sweep
    /// every unmarked, non-`Global` Occupied slot back to the free-list.
    pub fn collect(&mut self, roots: impl IntoIterator<Item = Addr>) {
        #[cfg(feature = "gc_logging")]
        let before = self.occupied_count();

        self.mark(roots);
        let freed = self.sweep();
        self.bump_gc_count();

        #[cfg(feature = "gc_logging")]
        tracing::debug!(before, freed, after = self.occupied_count(), "gc cycle");
        #[cfg(not(feature = "gc_logging"))]
        let _ = freed;
    }

    fn mark(&mut self, roots: impl IntoIterator<Item = Addr>) {
        let mut worklist: Vec<Addr> = roots.into_iter().collect();
        while let Some(addr) = worklist.pop() {
            let already_marked_or_global = match &self.slots[addr as usize] {
                Slot::Occupied { node, marked } => {
                    matches!(node, Node::Global { .. }) || *marked
                }
                Slot::Vacant { .. } => {
                    panic!("root {addr} points at a vacant slot: heap corruption")
                }
            };
            if already_marked_or_global {
                continue;
            }
            if let Slot::Occupied { marked, .. } = &mut self.slots[addr as usize] {
                *marked = true;
            }
            match self.node_at(addr) {
                Node::App { left, right } => {
                    worklist.push(*left);
                    worklist.push(*right);
                }
                Node::Ind { to } => worklist.push(*to),
                Node::Data { params, .. } => worklist.extend(params.iter().copied()),
                Node::Global { .. } | Node::Int { .. } => {}
            }
        }
    }

    fn sweep(&mut self) -> u64 {
        let mut freed = 0u64;
        for i in 0..self.slots.len() as Addr {
            let action = match &mut self.slots[i as usize] {
                Slot::Occupied {
                    node: Node::Global { .. },
                    ..
                } => None,
                Slot::Occupied { marked, .. } if *marked => {
                    *marked = false;
                    None
                }
                Slot::Occupied { .. } => Some(()),
                Slot::Vacant { .. } => None,
            };
            if action.is_some() {
                self.free(i);
                freed += 1;
            }
        }
        freed
    }
}
