//! Running external programs

pub mod command_runner;

pub use command_runner::{ProcessCommandRunner, redact};
