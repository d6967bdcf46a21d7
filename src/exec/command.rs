// src/exec/command.rs

//! Building the rsync invocation for one (job, destination) pair.

use std::ffi::OsStr;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::RepoConfig;
use crate::errors::{Result, SyncwatchError};
use crate::fs::FileSystem;

/// A fully-resolved synchronisation command.
///
/// The command is run through the shell (see [`SyncCommand::shell_line`]) so
/// that options written as a single word with spaces, such as `-e ssh`, are
/// split the way a user typing them would expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommand {
    pub program: PathBuf,
    pub options: Vec<String>,
    pub filter_file: PathBuf,
    pub source: PathBuf,
    pub destination: String,
}

impl SyncCommand {
    pub fn build(program: &Path, repo: &RepoConfig, filter_file: &Path, destination: &str) -> Self {
        Self {
            program: program.to_path_buf(),
            options: repo.options.clone(),
            filter_file: filter_file.to_path_buf(),
            source: repo.source.clone(),
            destination: destination.to_string(),
        }
    }

    /// `--filter='merge <file>'`, quoted for the shell.
    pub fn filter_arg(&self) -> String {
        let rule = format!("merge {}", self.filter_file.display());
        format!("--filter={}", quote_always(&rule))
    }

    /// Command line handed to `sh -c`.
    ///
    /// Options are emitted verbatim; the program, source and destination are
    /// quoted only when they contain characters the shell would interpret.
    pub fn shell_line(&self) -> String {
        let mut words = Vec::with_capacity(self.options.len() + 4);
        words.push(shell_quote(&self.program.to_string_lossy()));
        words.extend(self.options.iter().cloned());
        words.push(self.filter_arg());
        words.push(shell_quote(&self.source.to_string_lossy()));
        words.push(shell_quote(&self.destination));
        words.join(" ")
    }
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shell_line())
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_@%+=:,./~-".contains(c)
}

/// Quote `word` for a POSIX shell unless it is made only of safe characters.
///
/// `~` counts as safe so a leading tilde in a destination keeps expanding.
pub fn shell_quote(word: &str) -> String {
    if !word.is_empty() && word.chars().all(is_shell_safe) {
        word.to_string()
    } else {
        quote_always(word)
    }
}

fn quote_always(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// Temporary file holding a job's rsync filter rules.
///
/// The file is deleted when this value is dropped, whichever way the job ends.
#[derive(Debug)]
pub struct FilterFile {
    file: NamedTempFile,
}

impl FilterFile {
    pub fn create(filters: &[String]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("syncwatch-filter-")
            .suffix(".rules")
            .tempfile()?;
        file.write_all(filters.join("\n").as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Resolve the sync binary: paths are checked as given, bare names are
/// looked up on `PATH`.
pub fn locate_binary(name: &str, fs: &dyn FileSystem) -> Result<PathBuf> {
    locate_binary_in(name, std::env::var_os("PATH").as_deref(), fs)
}

pub fn locate_binary_in(
    name: &str,
    path_var: Option<&OsStr>,
    fs: &dyn FileSystem,
) -> Result<PathBuf> {
    let as_path = Path::new(name);
    if as_path.components().count() > 1 || as_path.is_absolute() {
        if fs.is_file(as_path) {
            return Ok(fs.canonicalize(as_path).unwrap_or_else(|_| as_path.to_path_buf()));
        }
        return Err(SyncwatchError::BinaryNotFound(name.to_string()));
    }

    let dirs = path_var.into_iter().flat_map(|p| std::env::split_paths(p));
    for dir in dirs {
        let candidate = dir.join(name);
        if fs.is_file(&candidate) {
            return Ok(candidate);
        }
        if cfg!(windows) {
            let exe = candidate.with_extension("exe");
            if fs.is_file(&exe) {
                return Ok(exe);
            }
        }
    }

    Err(SyncwatchError::BinaryNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn repo(options: &[&str]) -> RepoConfig {
        RepoConfig {
            name: "r".to_string(),
            source: PathBuf::from("/home/me/code"),
            destinations: vec!["host:/srv/code".to_string()],
            includes: vec![".*".to_string()],
            excludes: vec![],
            filters: vec![],
            options: options.iter().map(|s| s.to_string()).collect(),
            notify: false,
        }
    }

    #[test]
    fn shell_line_layout() {
        let cmd = SyncCommand::build(
            Path::new("/usr/bin/rsync"),
            &repo(&["--archive", "--delete", "-e ssh"]),
            Path::new("/tmp/f.rules"),
            "host:/srv/code",
        );
        assert_eq!(
            cmd.shell_line(),
            "/usr/bin/rsync --archive --delete -e ssh --filter='merge /tmp/f.rules' /home/me/code host:/srv/code"
        );
    }

    #[test]
    fn unsafe_words_are_quoted() {
        assert_eq!(shell_quote("~/backup dir"), "'~/backup dir'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("~/backup"), "~/backup");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn filter_file_holds_rules_and_is_removed() {
        let rules = vec!["- *.swp".to_string(), "+ src/".to_string()];
        let file = FilterFile::create(&rules).unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "- *.swp\n+ src/");
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn binary_found_on_path() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/bin/rsync", "");
        let path_var = std::env::join_paths(["/usr/bin", "/opt/bin"]).unwrap();

        let found = locate_binary_in("rsync", Some(path_var.as_os_str()), &fs).unwrap();
        assert_eq!(found, PathBuf::from("/opt/bin/rsync"));
    }

    #[test]
    fn missing_binary_is_reported() {
        let fs = MockFileSystem::new();
        let err = locate_binary_in("rsync", None, &fs).unwrap_err();
        assert!(matches!(err, SyncwatchError::BinaryNotFound(name) if name == "rsync"));

        let err = locate_binary_in("/nowhere/rsync", None, &fs).unwrap_err();
        assert!(matches!(err, SyncwatchError::BinaryNotFound(_)));
    }
}
