//! Crate-wide error type and small helpers

pub mod error;
pub mod utils;

pub use error::{Error, Result, WrapErr};
