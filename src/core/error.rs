//! Error handling for the package generator.
//!
//! This module defines the main error type `Error` used throughout the crate,
//! along with a convenient `Result` type alias. Errors are wrapped with the
//! operation that produced them as they unwind (see [`WrapErr`]), so the final
//! error carries a causal chain reachable through `std::error::Error::source`.
//!
//! # Examples
//!
//! ```
//! use openapi_packager::core::error::{Error, Result, WrapErr};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("boom")).wrap_err("failed to do the thing")
//! }
//!
//! let err = might_fail().unwrap_err();
//! assert_eq!(err.to_string(), "failed to do the thing");
//! ```

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for package generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for package generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// One or more required run-time inputs were not provided
    #[error("environment variables not found: {}", .0.join(", "))]
    MissingEnvironmentVariables(Vec<String>),

    /// A file the run depends on does not exist
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// One or more requested languages have no generator
    #[error("unsupported language: {}", .0.join(", "))]
    UnsupportedLanguage(Vec<String>),

    /// No generator configuration could be found for a language
    #[error("generator configuration not found for language: {language}")]
    ConfigNotFound {
        language: String,
        searched: Vec<PathBuf>,
    },

    /// A generator configuration file exists but is not valid JSON
    #[error("failed to parse generator configuration {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid tool configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external code generator failed for a language
    #[error("openapi generator failed for {language}")]
    GenerationFailed {
        language: String,
        #[source]
        source: Box<Error>,
    },

    /// A subprocess exited unsuccessfully
    #[error("command `{command}` exited with status {}", .exit_code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    /// A subprocess exceeded the configured timeout
    #[error("command `{command}` timed out after {timeout:?}")]
    CommandTimedOut { command: String, timeout: Duration },

    /// I/O error against a specific path
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Invalid regular expression
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The code host answered with a non-success status
    #[error("code host returned {status}: {message}")]
    CodeHost { status: u16, message: String },

    /// An error wrapped with the operation that produced it
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create an I/O error bound to the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap this error with a description of the failing operation
    pub fn wrap<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Walk the wrapping chain and return the innermost error
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        loop {
            match current {
                Error::Context { source, .. } | Error::GenerationFailed { source, .. } => {
                    current = source.as_ref()
                }
                _ => return current,
            }
        }
    }

    /// Captured process output, if the root cause is a failed command
    pub fn command_output(&self) -> Option<&str> {
        match self.root_cause() {
            Error::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Extension trait that wraps the error of a `Result` with operation context
pub trait WrapErr<T> {
    /// Wrap the error with a static description
    fn wrap_err<S: Into<String>>(self, context: S) -> Result<T>;

    /// Wrap the error with a lazily built description
    fn wrap_err_with<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> WrapErr<T> for std::result::Result<T, E> {
    fn wrap_err<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|e| e.into().wrap(context))
    }

    fn wrap_err_with<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().wrap(f()))
    }
}
