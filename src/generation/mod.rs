//! Generation domain module - turns an OpenAPI document into published packages
//!
//! This module holds the per-language generators, the configuration they
//! share and the ports through which they reach the outside world.

pub mod base;
pub mod config;
pub mod context;
pub mod languages;
pub mod npm;
pub mod registry;
pub mod repository;
pub mod templates;
pub mod traits;
pub mod types;

pub use base::BaseGenerator;
pub use config::{ConfigSet, ConfigStore, GeneratorConfig, ScopedConfig};
pub use context::{GenerationContext, GeneratorOptions, RunContext};
pub use registry::{build_generator, build_generators};
pub use traits::*;
pub use types::*;
