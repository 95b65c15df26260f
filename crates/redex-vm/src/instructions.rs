//! The G-machine's instruction primitives. Each allocates at most once,
//! and pushes its result before returning — the safepoint discipline that
//! makes it sound for `alloc` to collect mid-instruction (see
//! `Heap::alloc`'s doc comment and `reducer.rs`).

use redex_heap::{Addr, Node};

use crate::vm::Vm;

impl Vm {
    /// Push a known address (typically a `Global`'s) onto the stack.
    pub fn pushg(&mut self, addr: Addr) {
        self.stack.push(addr);
    }

    /// Allocate `Int(n)` and push it.
    pub fn pushi(&mut self, n: i32) {
        let a = self.alloc_node(Node::Int { value: n });
        self.stack.push(a);
    }

    /// Duplicate the `k`-th item (0 = current top) onto the top.
    pub fn push(&mut self, k: i64) {
        let a = self.stack.offset(k);
        self.stack.push(a);
    }

    /// Consume the top two items `f, x` and push `App(f, x)`.
    pub fn mkapp(&mut self) {
        let f = self.stack.offset(0);
        let x = self.stack.offset(1);
        let a = self.alloc_node(Node::App { left: f, right: x });
        self.stack.pop(1);
        self.stack.set_top(a);
    }

    /// Pop the top value `a` and rewrite the node at offset `k` in place
    /// to `Ind { to: a }`. This is the in-place thunk update that makes
    /// lazy sharing work: every prior reference to that address now
    /// observes the same reduced value.
    pub fn update(&mut self, k: i64) {
        let a = self.stack.top();
        self.stack.pop(1);
        let target = self.stack.offset(k);
        self.heap.set_node(target, Node::Ind { to: a });
    }

    /// Pop `arity` params (top-down) and push `Data(tag, params)`.
    pub fn pack(&mut self, tag: u32, arity: i64) {
        let params: Vec<Addr> = (0..arity).map(|i| self.stack.offset(i)).collect();
        let a = self.alloc_node(Node::Data { tag, params });
        self.stack.pop(arity);
        self.stack.push(a);
    }

    /// Pop a `Data` node and push its params in reverse index order, so
    /// `params[0]` (whatever was on top at `pack` time) ends up on top
    /// again — the inverse of `pack`.
    pub fn split(&mut self) {
        let a = self.stack.top();
        self.stack.pop(1);
        let params = match self.heap.node_at(a) {
            Node::Data { params, .. } => params.clone(),
            other => panic!("split of non-Data node ({})", other.kind()),
        };
        for p in params.into_iter().rev() {
            self.stack.push(p);
        }
    }

    /// Keep the top item, dropping the `n` items below it.
    pub fn slide(&mut self, n: i64) {
        let top = self.stack.top();
        self.stack.set_offset(n, top);
        self.stack.pop(n);
    }

    /// Drop the top `n` items.
    pub fn pop(&mut self, n: i64) {
        self.stack.pop(n);
    }

    /// Push `n` fresh `Ind(NULL_ADDR)` placeholders, for `letrec`-style
    /// mutually recursive bindings later fixed up by `update`. Named
    /// `alloc` for the primitive's spec name; see `Vm::alloc_node` for the
    /// heap-level allocation helper every primitive here is built on.
    pub fn alloc(&mut self, n: i64) {
        for _ in 0..n {
            let a = self.alloc_node(Node::Ind {
                to: redex_heap::NULL_ADDR,
            });
            self.stack.push(a);
        }
    }

    fn int_at(&self, offset: i64) -> i32 {
        let a = self.stack.offset(offset);
        match self.heap.node_at(a) {
            Node::Int { value } => *value,
            other => panic!("arithmetic on non-Int node ({}) at {a}", other.kind()),
        }
    }

    fn arith(&mut self, op: impl Fn(i32, i32) -> i32) {
        let x = self.int_at(0);
        let y = self.int_at(1);
        let a = self.alloc_node(Node::Int { value: op(x, y) });
        self.stack.pop(1);
        self.stack.set_top(a);
    }

    pub fn add(&mut self) {
        self.arith(|x, y| x.wrapping_add(y));
    }

    pub fn sub(&mut self) {
        self.arith(|x, y| x.wrapping_sub(y));
    }

    pub fn mul(&mut self) {
        self.arith(|x, y| x.wrapping_mul(y));
    }

    pub fn div(&mut self) {
        let x = self.int_at(0);
        let y = self.int_at(1);
        assert_ne!(y, 0, "division by zero");
        self.arith_result(x.wrapping_div(y));
    }

    pub fn rem(&mut self) {
        let x = self.int_at(0);
        let y = self.int_at(1);
        assert_ne!(y, 0, "division by zero");
        self.arith_result(x.wrapping_rem(y));
    }

    fn arith_result(&mut self, value: i32) {
        let a = self.alloc_node(Node::Int { value });
        self.stack.pop(1);
        self.stack.set_top(a);
    }

    fn cmp(&mut self, op: impl Fn(i32, i32) -> bool) {
        let x = self.int_at(0);
        let y = self.int_at(1);
        let tag = if op(x, y) { 1 } else { 0 };
        let a = self.alloc_node(Node::Data {
            tag,
            params: Vec::new(),
        });
        self.stack.pop(1);
        self.stack.set_top(a);
    }

    pub fn iseq(&mut self) {
        self.cmp(|x, y| x == y);
    }
    pub fn isne(&mut self) {
        self.cmp(|x, y| x != y);
    }
    pub fn islt(&mut self) {
        self.cmp(|x, y| x < y);
    }
    pub fn isle(&mut self) {
        self.cmp(|x, y| x <= y);
    }
    pub fn isgt(&mut self) {
        self.cmp(|x, y| x > y);
    }
    pub fn isge(&mut self) {
        self.cmp(|x, y| x >= y);
    }

    /// Boolean negation of a 0/1-tagged, zero-arity `Data` node.
    pub fn not(&mut self) {
        let a0 = self.stack.top();
        let tag = match self.heap.node_at(a0) {
            Node::Data { tag, params } if params.is_empty() => *tag,
            other => panic!("not of non-boolean node ({})", other.kind()),
        };
        let a = self.alloc_node(Node::Data {
            tag: if tag == 0 { 1 } else { 0 },
            params: Vec::new(),
        });
        self.stack.set_top(a);
    }
}

#[cfg(test)]
mod tests {
    use redex_heap::Heap;

    use crate::globals::Globals;
    use crate::vm::Vm;

    fn fresh_vm() -> Vm {
        Vm::new(Heap::new(), Globals::new(), redex_heap::NULL_ADDR)
    }

    #[test]
    fn pack_then_split_round_trips_param_order() {
        let mut vm = fresh_vm();
        vm.pushi(10);
        vm.pushi(20);
        vm.pushi(30);
        vm.pack(7, 3);
        vm.split();
        // `pack` reads params top-down (params[0] == the top at pack time,
        // 30), and `split` pushes params back in reverse index order — so
        // params[0] (30) is pushed last and ends up on top again, restoring
        // the pre-pack stack exactly.
        assert_eq!(vm.heap().node_at(vm.stack().offset(0)).as_int(), Some(30));
        assert_eq!(vm.heap().node_at(vm.stack().offset(1)).as_int(), Some(20));
        assert_eq!(vm.heap().node_at(vm.stack().offset(2)).as_int(), Some(10));
    }

    #[test]
    fn update_preserves_target_address_as_indirection() {
        let mut vm = fresh_vm();
        vm.pushi(1); // the thunk being updated (address recorded below)
        let target = vm.stack().offset(0);
        vm.pushi(99); // the result, now on top of the thunk slot
        vm.update(0); // pop the result, then offset(0) lands back on the thunk slot
        match vm.heap().node_at(target) {
            redex_heap::Node::Ind { to } => {
                assert_eq!(vm.heap().node_at(*to).as_int(), Some(99));
            }
            other => panic!("expected Ind, got {}", other.kind()),
        }
    }

    #[test]
    fn alloc_produces_distinct_null_indirections() {
        let mut vm = fresh_vm();
        vm.alloc(2);
        let a0 = vm.stack().offset(0);
        let a1 = vm.stack().offset(1);
        assert_ne!(a0, a1);
        for a in [a0, a1] {
            match vm.heap().node_at(a) {
                redex_heap::Node::Ind { to } => assert_eq!(*to, redex_heap::NULL_ADDR),
                other => panic!("expected Ind placeholder, got {}", other.kind()),
            }
        }
    }

    #[test]
    fn arithmetic_operand_order_matches_push_order() {
        let mut vm = fresh_vm();
        // sub is non-commutative: `int_at(0)` (top) minus `int_at(1)`, so
        // the minuend must be pushed last to end up on top.
        vm.pushi(3);
        vm.pushi(10);
        vm.sub();
        assert_eq!(vm.heap().node_at(vm.stack().top()).as_int(), Some(7));
    }

    #[test]
    fn slide_drops_items_below_top() {
        let mut vm = fresh_vm();
        vm.pushi(1);
        vm.pushi(2);
        vm.pushi(3);
        let top_addr = vm.stack().top();
        vm.slide(2);
        assert_eq!(vm.stack().sp(), 1);
        assert_eq!(vm.stack().top(), top_addr);
    }

    #[test]
    fn not_negates_boolean_shaped_data() {
        let mut vm = fresh_vm();
        vm.pack(0, 0); // False
        vm.not();
        assert_eq!(vm.heap().node_at(vm.stack().top()).as_data().unwrap().0, 1);
    }
}
