//! The driver protocol: push the input, apply the entry global, force to
//! WHNF, then walk the resulting cons spine printing each element.

use anyhow::{Result, bail};
use redex_vm::{Node, Vm};

/// Run the entry global applied to `input`, printing its list result
/// comma-separated and terminated by a newline.
pub fn run(vm: &mut Vm, input: i32) -> Result<()> {
    vm.pushi(input);
    let entry = vm.entry()?;
    vm.pushg(entry);
    vm.mkapp();
    vm.eval()?;

    let mut first = true;
    loop {
        let tag = match vm.heap().node_at(vm.stack().top()) {
            Node::Data { tag, .. } => *tag,
            other => bail!("entry result is not list-shaped (found {})", other.kind()),
        };
        if tag == 0 {
            break;
        }
        if tag != 1 {
            bail!("entry result used an unrecognized list tag {tag}");
        }

        vm.split(); // stack: [..., head, tail], head on top
        vm.eval()?; // force the head in place
        let value = match vm.heap().node_at(vm.stack().top()) {
            Node::Int { value } => *value,
            other => bail!("list element is not an Int (found {})", other.kind()),
        };
        if !first {
            print!(",");
        }
        print!("{value}");
        first = false;

        vm.pop(1); // drop the forced head, tail is now on top
        vm.eval()?; // force the tail for the next iteration
    }
    println!();
    Ok(())
}

/// Print the statistics block the driver protocol requires after the
/// result line: allocation count, free count, slab size, capacity,
/// occupancy, GC count, and current threshold.
pub fn print_stats(vm: &Vm) {
    let s = vm.heap().stats();
    println!("alloc_count={}", s.alloc_count);
    println!("free_count={}", s.free_count);
    println!("size={}", s.size);
    println!("capacity={}", s.capacity);
    println!("occupied={}", s.occupied);
    println!("gc_count={}", s.gc_count);
    println!("gc_threshold={}", s.gc_threshold);
}
