//! Error types for the GDB harness
//!
//! Every failure carries enough raw debugger output to diagnose a mismatch
//! without re-running the session. Environment problems (no gdb, no script)
//! get their own variants so callers can skip instead of fail.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the GDB harness
#[derive(Error, Debug)]
pub enum Error {
    // === Environment Errors ===
    #[error("Debugger executable '{0}' not found")]
    DebuggerNotFound(String),

    #[error("Interpreter executable '{0}' not found")]
    InterpreterNotFound(String),

    #[error("Pretty-printer script not found at '{}'", .0.display())]
    ScriptNotFound(PathBuf),

    // === Session Errors ===
    #[error("Debugger session terminated unexpectedly")]
    SessionTerminated,

    #[error("No debugger session running")]
    SessionNotRunning,

    // === Protocol Errors ===
    #[error("Expected a '$N = ' result annotation, got:\n{output}")]
    MissingResultAnnotation { output: String },

    #[error("Could not select frame for function '{function}', stack was:\n{stack}")]
    FrameNotFound { function: String, stack: String },

    #[error("Unexpected debugger output while {context}:\n{output}")]
    UnexpectedOutput { context: String, output: String },

    // === Assertion Errors ===
    #[error("Printing '{expr}' gave '{actual}', expected {expected}")]
    ReprMismatch {
        expr: String,
        expected: String,
        actual: String,
    },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an unexpected-output error with the raw response attached
    pub fn unexpected_output(context: &str, output: &str) -> Self {
        Self::UnexpectedOutput {
            context: context.to_string(),
            output: output.to_string(),
        }
    }

    /// Create a repr-mismatch error
    pub fn repr_mismatch(expr: &str, expected: String, actual: &str) -> Self {
        Self::ReprMismatch {
            expr: expr.to_string(),
            expected,
            actual: actual.to_string(),
        }
    }
}
