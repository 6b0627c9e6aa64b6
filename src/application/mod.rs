//! Application layer - run-time inputs and the use cases driving the generators

pub mod environment;
pub mod orchestrator;
pub mod settings;

pub use orchestrator::PackageOrchestrator;
pub use self_test::SelfTest;
pub use settings::ToolSettings;
