//! Common utilities shared between the harness library and the CLI

pub mod error;
pub mod logging;

pub use error::{Error, Result};
