//! Entry point: reads one integer from stdin, evaluates a registered
//! global to weak head normal form, and prints the result list followed
//! by a heap statistics block.

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use redex_vm::VmError;
use tracing_subscriber::filter::EnvFilter;

mod harness;
mod programs;

/// Drive a graph-reduction global to normal form and print its output.
#[derive(Parser)]
#[command(name = "redex", version, about = "G-machine entry harness")]
struct Cli {
    /// Demo program to evaluate (see `redex --list` for the registry)
    #[arg(default_value = "downfrom")]
    program: String,

    /// List the registered demo programs and exit
    #[arg(long = "list")]
    list: bool,

    /// Verbose diagnostic logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::from_default_env().add_directive("warn".parse()?)
        })
        .init();

    if cli.list {
        for name in programs::registry_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let input = read_stdin_int()?;
    let mut vm = programs::build(&cli.program)
        .with_context(|| format!("unknown program '{}' (see --list)", cli.program))?;

    harness::run(&mut vm, input)?;
    harness::print_stats(&vm);

    Ok(())
}

/// Read one whitespace-terminated decimal integer from stdin.
fn read_stdin_int() -> Result<i32> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    let tok = buf
        .split_whitespace()
        .next()
        .ok_or_else(|| VmError::InputParse("stdin was empty".to_string()))?;
    let value = tok
        .parse::<i32>()
        .map_err(|_| VmError::InputParse(format!("'{tok}' is not a valid integer")))?;
    Ok(value)
}
