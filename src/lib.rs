//! Generate client packages from an OpenAPI specification and publish them
//! to each language's registry or package repository.

pub mod application;
pub mod core;
pub mod generation;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_support;
