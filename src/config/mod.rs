// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: the YAML-backed records and the validated [`RepoConfig`].
//! - `loader.rs`: reading a document from disk, per-repository isolation.
//! - `validate.rs`: record validation and `~` expansion.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use model::{
    EventHandlerConfig, LoadedConfig, RawRepoConfig, RejectedRepo, RepoConfig, RsyncConfig,
};
pub use validate::expand_tilde;
