// src/config/loader.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::config::model::{LoadedConfig, RawRepoConfig, RejectedRepo, RepoConfig};
use crate::errors::{Result, SyncwatchError};
use crate::fs::{FileSystem, RealFileSystem};

/// Read a configuration file and return its top-level mapping, untouched.
///
/// Fails only when the document as a whole is unusable (unreadable, not
/// YAML, or not a mapping). Individual records are validated by
/// [`load_and_validate`].
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<Mapping> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;
    parse_document(&contents)
}

fn parse_document(contents: &str) -> Result<Mapping> {
    match serde_yaml::from_str::<Value>(contents)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Err(SyncwatchError::ConfigError(
            "configuration document is empty".to_string(),
        )),
        _ => Err(SyncwatchError::ConfigError(
            "configuration document must be a mapping of repository name to settings"
                .to_string(),
        )),
    }
}

/// Load a configuration file from disk and validate every repository in it.
///
/// This is the entry point used by the application. A record that fails
/// validation only takes itself out; the rest are returned in document
/// order. A document with no valid repository at all is an error.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LoadedConfig> {
    let document = load_from_path(&RealFileSystem, path)?;
    validate_document(document)
}

/// Same as [`load_and_validate`] but from an in-memory YAML string.
pub fn load_from_str(contents: &str) -> Result<LoadedConfig> {
    validate_document(parse_document(contents)?)
}

fn validate_document(document: Mapping) -> Result<LoadedConfig> {
    let mut loaded = LoadedConfig::default();

    for (key, value) in document {
        let name = match key {
            Value::String(s) => s,
            other => {
                let name = format!("{other:?}");
                loaded.rejected.push(RejectedRepo {
                    name,
                    error: SyncwatchError::ConfigError(
                        "repository names must be strings".to_string(),
                    ),
                });
                continue;
            }
        };

        match validate_record(&name, value) {
            Ok(repo) => loaded.repos.push(Arc::new(repo)),
            Err(error) => {
                warn!(repo = %name, error = %error, "skipping invalid repository configuration");
                loaded.rejected.push(RejectedRepo { name, error });
            }
        }
    }

    if loaded.repos.is_empty() {
        return Err(SyncwatchError::ConfigError(
            "configuration contains no valid repository".to_string(),
        ));
    }

    Ok(loaded)
}

fn validate_record(name: &str, value: Value) -> Result<RepoConfig> {
    let raw: RawRepoConfig = serde_yaml::from_value(value).map_err(|e| {
        SyncwatchError::ConfigError(format!("repository '{name}': {e}"))
    })?;
    RepoConfig::from_raw(name, raw)
}

/// Default configuration location: `config.yaml` in the home directory,
/// falling back to the current directory when there is no home.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.yaml")
}
