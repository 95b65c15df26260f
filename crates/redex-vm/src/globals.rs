//! The globals table: supercombinators' `(arity, code)` pairs, installed
//! once at startup by a host-supplied registration routine.
//!
//! Code bodies are closures rather than function pointers so a test or a
//! demo program can capture state (e.g. a counter used to observe sharing,
//! scenario 4 in the original design). Storage is `Rc` so `unwind` can
//! clone a body out before invoking it, rather than holding a borrow of
//! the table across a call that needs `&mut Vm` (which owns the table).

use std::rc::Rc;

use redex_heap::{Addr, CodeRef, Heap, Node};

use crate::error::VmResult;
use crate::vm::Vm;

/// A supercombinator's compiled body: a closure over the instruction
/// primitives, invoked once its arguments have been extracted onto the
/// stack.
pub type CodeBody = dyn Fn(&mut Vm) -> VmResult<()>;

/// The set of registered globals, keyed by [`CodeRef`].
#[derive(Default)]
pub struct Globals {
    bodies: Vec<Rc<CodeBody>>,
    names: Vec<&'static str>,
}

impl Globals {
    pub fn new() -> Self {
        Globals::default()
    }

    pub(crate) fn body(&self, code: CodeRef) -> Rc<CodeBody> {
        Rc::clone(&self.bodies[code.0 as usize])
    }

    pub fn name(&self, code: CodeRef) -> &'static str {
        self.names[code.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Builder used by the host's global-registration routine: allocates each
/// supercombinator's `Global` node via [`Heap::alloc_nogc`] (no stack
/// exists yet to root anything) and records its code body.
pub struct GlobalsBuilder<'h> {
    heap: &'h mut Heap,
    globals: Globals,
}

impl<'h> GlobalsBuilder<'h> {
    pub fn new(heap: &'h mut Heap) -> Self {
        GlobalsBuilder {
            heap,
            globals: Globals::new(),
        }
    }

    /// Register a supercombinator of the given name and arity, returning
    /// its heap address. `name` is used only for diagnostics and tracing.
    pub fn define(
        &mut self,
        name: &'static str,
        arity: u32,
        body: impl Fn(&mut Vm) -> VmResult<()> + 'static,
    ) -> Addr {
        let idx = self.globals.bodies.len() as u32;
        self.globals.bodies.push(Rc::new(body));
        self.globals.names.push(name);
        let code = CodeRef(idx);
        let addr = self.heap.alloc_nogc(Node::Global { arity, code });
        tracing::trace!(name, arity, addr, "registered global");
        addr
    }

    pub fn finish(self) -> Globals {
        self.globals
    }
}
