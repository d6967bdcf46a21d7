// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds the rsync command line, the per-job filter file, and
//!   resolves the rsync binary at startup.
//! - [`backend`] provides the `ProcessRunner` trait and the
//!   `ShellProcessRunner` used in production.

pub mod backend;
pub mod command;

pub use backend::{ProcessOutput, ProcessRunner, ShellProcessRunner};
pub use command::{locate_binary, shell_quote, FilterFile, SyncCommand};
