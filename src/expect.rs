//! Expected-text comparison for printed values
//!
//! An expectation is either a literal string or a regex pattern; patterns
//! are written with a leading `^` so they match from the start of the
//! rendering. Heap-located values are printed through a dereference and may
//! carry a type or address prefix, which the comparison tolerates.

use std::fmt;

use regex::Regex;

use crate::common::{Error, Result};
use crate::session::GdbSession;

/// An expected rendering: exact text, or a pattern.
#[derive(Debug, Clone)]
pub enum Expected {
    Literal(String),
    Pattern(Regex),
}

impl Expected {
    /// Whether the rendered text satisfies this expectation.
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Expected::Literal(s) => actual == s,
            Expected::Pattern(re) => re.is_match(actual),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(s) => write!(f, "'{s}'"),
            Expected::Pattern(re) => write!(f, "pattern /{re}/"),
        }
    }
}

impl From<&str> for Expected {
    fn from(s: &str) -> Self {
        Expected::Literal(s.to_string())
    }
}

impl From<String> for Expected {
    fn from(s: String) -> Self {
        Expected::Literal(s)
    }
}

impl From<Regex> for Expected {
    fn from(re: Regex) -> Self {
        Expected::Pattern(re)
    }
}

/// Check printing a stack-located value.
pub fn check_stack_repr(
    gdb: &mut GdbSession,
    expr: &str,
    expected: impl Into<Expected>,
) -> Result<()> {
    let expected = expected.into();
    let actual = gdb.print_value(expr)?;
    if expected.matches(&actual) {
        Ok(())
    } else {
        Err(Error::repr_mismatch(expr, expected.to_string(), &actual))
    }
}

/// Check printing a heap-located value, given an expression for its address.
pub fn check_heap_repr(gdb: &mut GdbSession, expr: &str, expected: &str) -> Result<()> {
    let actual = gdb.print_value(&format!("*{expr}"))?;
    if heap_repr_matches(&actual, expected) {
        Ok(())
    } else {
        Err(Error::repr_mismatch(expr, format!("'{expected}'"), &actual))
    }
}

/// GDB may prefix a dereferenced value with an address or type
/// specification, so accept an exact match or a suffix match after such a
/// prefix.
pub fn heap_repr_matches(actual: &str, expected: &str) -> bool {
    actual == expected || actual.ends_with(&format!(" {expected}"))
}
