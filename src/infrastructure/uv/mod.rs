//! uv (Python packaging) adapter

pub mod uv_client;

pub use uv_client::UvClient;
