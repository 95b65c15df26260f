//! Demo supercombinator registry.
//!
//! Compiling a surface language is out of scope here, so these globals are
//! hand-assembled instruction sequences, the way the worked examples in the
//! core's own tests are — just wired up as a small named registry instead
//! of one-off test fixtures.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Result, bail};
use redex_heap::Heap;
use redex_vm::{Addr, GlobalsBuilder, Vm};

pub fn registry_names() -> &'static [&'static str] {
    &["downfrom", "singleton"]
}

/// Build a fresh [`Vm`] with the named demo program registered as the
/// entry point.
pub fn build(name: &str) -> Result<Vm> {
    match name {
        "downfrom" => Ok(downfrom()),
        "singleton" => Ok(singleton()),
        other => bail!("no such program: {other}"),
    }
}

/// `downfrom n = if n == 0 then nil else cons (n - 1) (downfrom (n - 1))`
///
/// Applied to `n`, produces the descending list `[n-1, n-2, ..., 0]`,
/// exercising recursive self-application and (for large `n`) the
/// collector.
fn downfrom() -> Vm {
    let mut heap = Heap::new();
    let mut builder = GlobalsBuilder::new(&mut heap);

    let addr_cell: Rc<Cell<Addr>> = Rc::new(Cell::new(0));
    let downfrom_addr = {
        let addr_cell = Rc::clone(&addr_cell);
        builder.define("downfrom", 1, move |vm| {
            vm.push(0);
            vm.pushi(0);
            vm.iseq();
            vm.eval().unwrap();
            let tag = vm.heap().node_at(vm.stack().top()).as_data().unwrap().0;
            vm.pop(1);

            if tag == 1 {
                vm.pack(0, 0); // nil
            } else {
                vm.pushi(1);
                vm.push(1); // duplicate n
                vm.sub(); // m = n - 1
                vm.push(0); // duplicate m for the recursive call
                vm.pushg(addr_cell.get());
                vm.mkapp(); // tail = downfrom(m)
                vm.push(1); // duplicate m again as the head
                vm.pack(1, 2); // cons(head, tail)
                vm.slide(1); // drop the now-unneeded m below the result
            }
            vm.update(1);
            vm.pop(1);
            vm.unwind()
        })
    };
    addr_cell.set(downfrom_addr);

    let globals = builder.finish();
    Vm::new(heap, globals, downfrom_addr)
}

/// `singleton n = cons n nil`, the one-element list.
fn singleton() -> Vm {
    let mut heap = Heap::new();
    let mut builder = GlobalsBuilder::new(&mut heap);

    let entry = builder.define("singleton", 1, |vm| {
        vm.pack(0, 0); // nil
        vm.push(1); // duplicate the argument, below nil
        vm.eval().unwrap();
        vm.pack(1, 2); // cons(head, nil)
        vm.update(1);
        vm.pop(1);
        vm.unwind()
    });

    let globals = builder.finish();
    Vm::new(heap, globals, entry)
}
