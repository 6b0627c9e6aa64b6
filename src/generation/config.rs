//! Generator configuration store
//!
//! Each language ships an `openapi-generator-cli` document named
//! `<language>-openapitools.json`. The store merges the entries for every
//! requested language into one in-memory [`ConfigSet`] which is serialized in
//! full to the working directory right before the generator runs. Generators
//! only ever see a [`ScopedConfig`], which can mutate its own entry and nothing
//! else.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::core::{Error, Result, WrapErr, utils::to_pretty_json};
use crate::generation::traits::FileSystem;
use crate::generation::types::Language;

/// Name of the merged document the generator reads from its working directory
pub const CONFIG_FILE_NAME: &str = "openapitools.json";

/// Per-language configuration file name
pub fn language_config_file_name(language: Language) -> String {
    format!("{}-{CONFIG_FILE_NAME}", language.as_str())
}

/// The full `openapitools.json` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSet {
    #[serde(rename = "$schema", default, skip_serializing_if = "String::is_empty")]
    pub schema: String,
    #[serde(default)]
    pub spaces: u32,
    #[serde(rename = "generator-cli", default)]
    pub generator_cli: GeneratorCli,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorCli {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub generators: BTreeMap<String, GeneratorConfig>,
}

/// One generator entry, keyed by language in [`GeneratorCli::generators`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default)]
    pub generator_name: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub input_spec: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_repo_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_user_id: String,
    #[serde(
        default,
        deserialize_with = "string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub global_property: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub additional_properties: BTreeMap<String, String>,
}

// Accepts null for an empty map and stringifies scalar values such as `true`.
fn string_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, JsonValue>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                JsonValue::String(s) => s,
                JsonValue::Null => String::new(),
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

impl ConfigSet {
    /// Parse a configuration document
    pub fn from_slice(path: &Path, data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the entry for a language, if present
    pub fn generator(&self, language: Language) -> Option<&GeneratorConfig> {
        self.generator_cli.generators.get(language.as_str())
    }
}

/// Process-wide store shared by every generator in a run
#[derive(Debug, Default)]
pub struct ConfigStore {
    inner: Mutex<ConfigSet>,
}

impl ConfigStore {
    pub fn new(set: ConfigSet) -> Self {
        Self {
            inner: Mutex::new(set),
        }
    }

    /// Load the configuration of every requested language.
    ///
    /// For each language the search directories are tried in order and the
    /// first existing `<language>-openapitools.json` wins. The document header
    /// (`$schema`, `spaces`, CLI version) is taken from the first file loaded.
    pub async fn load(
        files: &dyn FileSystem,
        search_dirs: &[PathBuf],
        languages: &[Language],
    ) -> Result<Self> {
        let mut merged: Option<ConfigSet> = None;

        for &language in languages {
            let (path, set) = Self::load_language(files, search_dirs, language).await?;
            let Some(generator) = set.generator(language).cloned() else {
                return Err(Error::ConfigNotFound {
                    language: language.to_string(),
                    searched: vec![path],
                });
            };
            debug!(language = %language, path = %path.display(), "Loaded generator configuration");

            let target = merged.get_or_insert_with(|| ConfigSet {
                schema: set.schema.clone(),
                spaces: set.spaces,
                generator_cli: GeneratorCli {
                    version: set.generator_cli.version.clone(),
                    generators: BTreeMap::new(),
                },
            });
            target
                .generator_cli
                .generators
                .insert(language.as_str().to_string(), generator);
        }

        Ok(Self::new(merged.unwrap_or_default()))
    }

    async fn load_language(
        files: &dyn FileSystem,
        search_dirs: &[PathBuf],
        language: Language,
    ) -> Result<(PathBuf, ConfigSet)> {
        let file_name = language_config_file_name(language);
        let mut searched = Vec::with_capacity(search_dirs.len());

        for dir in search_dirs {
            let path = dir.join(&file_name);
            if files.exists(&path).await? {
                let data = files
                    .read(&path)
                    .await
                    .wrap_err_with(|| format!("failed to read {}", path.display()))?;
                let set = ConfigSet::from_slice(&path, &data)?;
                return Ok((path, set));
            }
            searched.push(path);
        }

        Err(Error::ConfigNotFound {
            language: language.to_string(),
            searched,
        })
    }

    /// A mutable view restricted to one language's entry
    pub fn scoped(self: &Arc<Self>, language: Language) -> Result<ScopedConfig> {
        if self.lock().generator(language).is_none() {
            return Err(Error::ConfigNotFound {
                language: language.to_string(),
                searched: Vec::new(),
            });
        }
        Ok(ScopedConfig {
            store: Arc::clone(self),
            language,
        })
    }

    /// A copy of the current configuration set
    pub fn snapshot(&self) -> ConfigSet {
        self.lock().clone()
    }

    /// Serialize the entire set as written to the working directory
    pub fn to_json(&self) -> Result<Vec<u8>> {
        to_pretty_json(&*self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, ConfigSet> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle that can only read and mutate a single language's entry
#[derive(Debug, Clone)]
pub struct ScopedConfig {
    store: Arc<ConfigStore>,
    language: Language,
}

impl ScopedConfig {
    pub fn language(&self) -> Language {
        self.language
    }

    /// Apply a mutation to this language's entry
    pub fn update<F: FnOnce(&mut GeneratorConfig)>(&self, f: F) {
        let mut set = self.store.lock();
        if let Some(generator) = set.generator_cli.generators.get_mut(self.language.as_str()) {
            f(generator);
        }
    }

    /// A copy of this language's entry
    pub fn get(&self) -> GeneratorConfig {
        self.store
            .lock()
            .generator(self.language)
            .cloned()
            .unwrap_or_default()
    }

    /// Serialize the whole set, all languages included
    pub fn to_json(&self) -> Result<Vec<u8>> {
        self.store.to_json()
    }
}
