#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use syncwatch::config::{EventHandlerConfig, RawRepoConfig, RepoConfig, RsyncConfig};

/// Builder for `RepoConfig`, going through the same validation as a loaded
/// YAML record.
pub struct RepoConfigBuilder {
    name: String,
    raw: RawRepoConfig,
}

impl RepoConfigBuilder {
    pub fn new(name: &str, source: impl AsRef<Path>) -> Self {
        Self {
            name: name.to_string(),
            raw: RawRepoConfig {
                source: source.as_ref().to_string_lossy().into_owned(),
                destinations: Vec::new(),
                notify: false,
                event_handler: EventHandlerConfig::default(),
                rsync: RsyncConfig::default(),
            },
        }
    }

    pub fn destination(mut self, dest: &str) -> Self {
        self.raw.destinations.push(dest.to_string());
        self
    }

    /// Replace the default `.*` include list.
    pub fn includes(mut self, patterns: &[&str]) -> Self {
        self.raw.event_handler.includes = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.raw.event_handler.excludes.push(pattern.to_string());
        self
    }

    pub fn filter(mut self, rule: &str) -> Self {
        self.raw.rsync.filters.push(rule.to_string());
        self
    }

    /// Replace the default rsync options.
    pub fn options(mut self, options: &[&str]) -> Self {
        self.raw.rsync.options = options.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn notify(mut self, val: bool) -> Self {
        self.raw.notify = val;
        self
    }

    pub fn build(self) -> Arc<RepoConfig> {
        Arc::new(
            RepoConfig::from_raw(self.name, self.raw)
                .expect("Failed to build valid repo config from builder"),
        )
    }
}
