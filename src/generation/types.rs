//! Core types for the generation domain

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::Error;

/// Target languages a client package can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    Java,
    Angular,
    JavaScript,
    TypeScript,
    Python,
    Go,
    Rust,
}

impl Language {
    /// The generator key used in configuration files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "csharp",
            Language::Java => "java",
            Language::Angular => "angular",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }

    /// Get the display name for this language
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::CSharp => "C#",
            Language::Java => "Java",
            Language::Angular => "Angular",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Go => "Go",
            Language::Rust => "Rust",
        }
    }

    /// Whether packages for this language are published by pull request
    /// against a shared package repository rather than pushed to a registry
    pub fn is_repository_backed(&self) -> bool {
        matches!(self, Language::Python | Language::Go | Language::Rust)
    }

    /// Get all supported languages
    pub fn all() -> Vec<Language> {
        vec![
            Language::CSharp,
            Language::Java,
            Language::Angular,
            Language::JavaScript,
            Language::TypeScript,
            Language::Python,
            Language::Go,
            Language::Rust,
        ]
    }

    /// Parses every identifier, collecting all unrecognized names into a single error
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Language>, Error> {
        let mut languages = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            match name.as_ref().parse::<Language>() {
                Ok(language) => languages.push(language),
                Err(_) => unknown.push(name.as_ref().to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(Error::UnsupportedLanguage(unknown));
        }
        Ok(languages)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Ok(Language::CSharp),
            "java" => Ok(Language::Java),
            "angular" => Ok(Language::Angular),
            "javascript" | "js" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "python" | "py" => Ok(Language::Python),
            "go" | "golang" => Ok(Language::Go),
            "rust" => Ok(Language::Rust),
            _ => Err(Error::UnsupportedLanguage(vec![s.to_string()])),
        }
    }
}

/// The directory tree produced for one language, consumed by the push step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArtifact {
    pub language: Language,
    pub package_name: String,
    pub version: String,
    pub path: PathBuf,
}
