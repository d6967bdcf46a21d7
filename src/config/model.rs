// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// One repository record as written in the YAML document.
///
/// The repository *name* is the mapping key, not a field:
///
/// ```yaml
/// notes:
///   source: ~/notes
///   destinations: ["backup:/srv/notes"]
///   notify: true
///   event_handler:
///     excludes: ['^\.git/']
///   rsync:
///     filters: ["- *.swp"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRepoConfig {
    /// Directory to watch. A leading `~` is expanded at load time.
    pub source: String,

    /// rsync destinations, synchronised in this order.
    pub destinations: Vec<String>,

    #[serde(default)]
    pub notify: bool,

    #[serde(default)]
    pub event_handler: EventHandlerConfig,

    #[serde(default)]
    pub rsync: RsyncConfig,
}

/// `event_handler:` section: which changed paths are worth a sync.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventHandlerConfig {
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,
}

impl Default for EventHandlerConfig {
    fn default() -> Self {
        Self {
            includes: default_includes(),
            excludes: Vec::new(),
        }
    }
}

/// `rsync:` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RsyncConfig {
    /// Lines in rsync "FILTER RULES" syntax, merged through a temporary file.
    #[serde(default)]
    pub filters: Vec<String>,

    /// Flags passed to rsync verbatim.
    #[serde(default = "default_options")]
    pub options: Vec<String>,
}

impl Default for RsyncConfig {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            options: default_options(),
        }
    }
}

pub fn default_includes() -> Vec<String> {
    vec![".*".to_string()]
}

pub fn default_options() -> Vec<String> {
    ["--archive", "--delete", "-e ssh"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Validated, immutable description of one watched repository.
///
/// Built once at startup (see [`RepoConfig::from_raw`]) and then shared via
/// `Arc` with the event filter and every queued job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    pub name: String,
    pub source: PathBuf,
    pub destinations: Vec<String>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub filters: Vec<String>,
    pub options: Vec<String>,
    pub notify: bool,
}

/// Result of loading a whole document: the repositories that validated, in
/// document order, plus the ones that were rejected and why.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub repos: Vec<std::sync::Arc<RepoConfig>>,
    pub rejected: Vec<RejectedRepo>,
}

#[derive(Debug)]
pub struct RejectedRepo {
    pub name: String,
    pub error: crate::errors::SyncwatchError,
}
