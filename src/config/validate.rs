// src/config/validate.rs

use std::path::PathBuf;

use crate::config::model::{RawRepoConfig, RepoConfig};
use crate::errors::{Result, SyncwatchError};
use crate::watch::filter::compile_patterns;

impl RepoConfig {
    /// Validate a raw record and turn it into a `RepoConfig`.
    ///
    /// Checks that the name and destination list are non-empty and that every
    /// include/exclude pattern compiles. Whether `source` exists is checked
    /// later, when its watch is installed.
    pub fn from_raw(name: impl Into<String>, raw: RawRepoConfig) -> Result<Self> {
        let name = name.into();

        ensure_name(&name)?;
        ensure_destinations(&name, &raw.destinations)?;

        compile_patterns(&raw.event_handler.includes).map_err(|e| {
            SyncwatchError::ConfigError(format!("repository '{name}' has an invalid include: {e}"))
        })?;
        compile_patterns(&raw.event_handler.excludes).map_err(|e| {
            SyncwatchError::ConfigError(format!("repository '{name}' has an invalid exclude: {e}"))
        })?;

        Ok(RepoConfig {
            source: expand_tilde(&raw.source),
            destinations: raw.destinations,
            includes: raw.event_handler.includes,
            excludes: raw.event_handler.excludes,
            filters: raw.rsync.filters,
            options: raw.rsync.options,
            notify: raw.notify,
            name,
        })
    }
}

fn ensure_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SyncwatchError::ConfigError(
            "repository name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn ensure_destinations(name: &str, destinations: &[String]) -> Result<()> {
    if destinations.is_empty() {
        return Err(SyncwatchError::ConfigError(format!(
            "repository '{name}' must list at least one destination"
        )));
    }
    if destinations.iter().any(|d| d.trim().is_empty()) {
        return Err(SyncwatchError::ConfigError(format!(
            "repository '{name}' has an empty destination"
        )));
    }
    Ok(())
}

/// Expand a leading `~` (alone or followed by `/`) to the home directory.
///
/// `~user` forms are left untouched, as is everything when no home directory
/// can be determined.
pub fn expand_tilde(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return PathBuf::from(raw),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest.trim_start_matches('/')),
        None => PathBuf::from(raw),
    }
}
