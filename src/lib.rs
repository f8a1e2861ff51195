//! Harness for validating GDB pretty-printer output for Arrow data structures
//!
//! Drives a `gdb` subprocess as a line-oriented REPL, loads the external
//! pretty-printer script, traps inside a purpose-built test entry point and
//! compares printed values against expected renderings.

pub mod common;
pub mod expect;
pub mod fixture;
pub mod session;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use expect::{check_heap_repr, check_stack_repr, Expected};
pub use session::GdbSession;
