//! VM-level fatal errors — everything that isn't a programmer-error trap.
//!
//! Malformed-graph conditions (dereferencing `NULL_ADDR`, arithmetic on a
//! non-`Int`, `split` of non-`Data`, ...) are treated as compiler bugs per
//! the reducer's contract and panic directly rather than flowing through
//! here; the compiler emitting globals' code bodies is assumed well-typed.

use thiserror::Error;

/// Errors the entry harness surfaces to the user with a nonzero exit code.
#[derive(Debug, Error)]
pub enum VmError {
    /// Evaluation nested `eval`/`unwind` deeper than the configured limit.
    /// Distinguished from a native stack overflow so the harness can print
    /// a diagnostic instead of crashing uncontrolled.
    #[error("evaluation exceeded maximum depth of {0}")]
    StackDepthExceeded(usize),

    /// Input on stdin was not a well-formed, whitespace-terminated decimal
    /// integer.
    #[error("malformed integer input: {0}")]
    InputParse(String),

    /// No entry global was registered before `run` was called.
    #[error("no entry point registered")]
    NoEntryPoint,
}

/// Result type used by the reducer and the entry harness.
pub type VmResult<T> = std::result::Result<T, VmError>;
