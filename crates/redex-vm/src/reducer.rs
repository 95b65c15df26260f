//! `eval`/`unwind`: the mutually-recursive pair that drives a node to weak
//! head normal form (WHNF) — `Int`, `Data`, or an undersaturated `Global`.

use redex_heap::Node;

use crate::error::{VmError, VmResult};
use crate::vm::Vm;

impl Vm {
    /// Force the top-of-stack address to WHNF in place. Opens a nested
    /// frame (saving the caller's `bp` in the vacated slot) so `unwind`'s
    /// spine-walking and any nested `eval`s it triggers can't see past
    /// this evaluation's own arguments.
    pub fn eval(&mut self) -> VmResult<()> {
        self.eval_depth += 1;
        if self.eval_depth > self.config.max_eval_depth {
            self.eval_depth -= 1;
            return Err(VmError::StackDepthExceeded(self.config.max_eval_depth));
        }

        let a = self.stack.top();
        self.stack.set_top(self.stack.bp());
        self.stack.set_bp(self.stack.sp());
        self.stack.push(a);
        let result = self.unwind();

        self.eval_depth -= 1;
        result
    }

    /// Walk the spine of `top()` until it names WHNF, dereferencing
    /// indirections and applying saturated globals along the way. Exposed
    /// directly (not just through `eval`) because a compiled
    /// supercombinator body conventionally ends with its own `unwind`,
    /// which tears down the very frame this call opened.
    pub fn unwind(&mut self) -> VmResult<()> {
        loop {
            let a = self.stack.top();
            match self.heap.node_at(a).clone() {
                Node::App { left, .. } => {
                    self.stack.push(left);
                }
                Node::Ind { to } => {
                    self.stack.set_top(to);
                }
                Node::Global { arity, code } => {
                    let avail = self.stack.sp() - self.stack.bp() - 1;
                    if avail >= arity as i64 {
                        // Replace each spine App on the stack with its
                        // argument; the App nodes themselves stay
                        // reachable via the frame's bottom slot (the
                        // application root) until `update` overwrites it.
                        for i in 0..arity as i64 {
                            let app_addr = self.stack.offset(i + 1);
                            let arg = match self.heap.node_at(app_addr) {
                                Node::App { right, .. } => *right,
                                other => {
                                    panic!("spine slot held non-App node ({})", other.kind())
                                }
                            };
                            self.stack.set_offset(i, arg);
                        }
                        // A supercombinator body's own instruction sequence
                        // always ends by calling `unwind` itself (see the
                        // worked examples), which collapses this same
                        // frame. Returning here instead of looping again
                        // avoids re-collapsing a frame the body already
                        // tore down.
                        let body = self.globals.body(code);
                        return (*body)(self);
                    } else {
                        // Undersaturated: the frame's bottom slot still
                        // holds the original application root untouched,
                        // since no spine-argument extraction ran.
                        let p = self.stack.bp();
                        let root = self.stack.get_abs(p);
                        self.collapse(p, root);
                        return Ok(());
                    }
                }
                Node::Data { .. } | Node::Int { .. } => {
                    let p = self.stack.bp();
                    self.collapse(p, a);
                    return Ok(());
                }
            }
        }
    }

    /// Restore the enclosing frame (`sp := p`, `bp := saved bp`) and leave
    /// `result` on top. Must read anything still needed from above `p`
    /// before calling — `p` and everything past it is discarded.
    fn collapse(&mut self, p: i64, result: redex_heap::Addr) {
        let saved_bp = self.stack.get_abs(p - 1);
        self.stack.truncate_to(p);
        self.stack.set_bp(saved_bp);
        self.stack.set_top(result);
    }
}
