//! One generator per target language

pub mod angular;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod rust;

pub use angular::AngularGenerator;
pub use csharp::CSharpGenerator;
pub use go::GoGenerator;
pub use java::JavaGenerator;
pub use javascript::JavaScriptGenerator;
pub use python::PythonGenerator;
pub use rust::RustGenerator;
