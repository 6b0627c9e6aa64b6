//! Local filesystem adapter

pub mod local_filesystem;

pub use local_filesystem::LocalFileSystem;
