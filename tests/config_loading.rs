// tests/config_loading.rs

use std::io::Write;

use tempfile::NamedTempFile;
use syncwatch::config::{load_and_validate, load_from_str};
use syncwatch::errors::SyncwatchError;

#[test]
fn minimal_record_gets_defaults() {
    let cfg = load_from_str(
        r#"
docs:
  source: /srv/docs
  destinations: ["backup:/srv/docs"]
"#,
    )
    .unwrap();

    assert!(cfg.rejected.is_empty());
    let repo = &cfg.repos[0];
    assert_eq!(repo.name, "docs");
    assert_eq!(repo.includes, vec![".*".to_string()]);
    assert!(repo.excludes.is_empty());
    assert!(repo.filters.is_empty());
    assert_eq!(repo.options, vec!["--archive", "--delete", "-e ssh"]);
    assert!(!repo.notify);
}

#[test]
fn full_record_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
code:
  source: /home/me/code
  destinations:
    - host1:/srv/code
    - /mnt/backup/code
  notify: true
  event_handler:
    includes: ['.*\.go$']
    excludes: ['^\.git/']
  rsync:
    filters: ["- *.swp", "- node_modules/"]
    options: ["-az"]
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    let repo = &cfg.repos[0];
    assert_eq!(repo.destinations, vec!["host1:/srv/code", "/mnt/backup/code"]);
    assert_eq!(repo.includes, vec![r".*\.go$"]);
    assert_eq!(repo.excludes, vec![r"^\.git/"]);
    assert_eq!(repo.filters, vec!["- *.swp", "- node_modules/"]);
    assert_eq!(repo.options, vec!["-az"]);
    assert!(repo.notify);
}

#[test]
fn repositories_keep_document_order() {
    let cfg = load_from_str(
        r#"
zeta: {source: /z, destinations: [/dz]}
alpha: {source: /a, destinations: [/da]}
mid: {source: /m, destinations: [/dm]}
"#,
    )
    .unwrap();

    let names: Vec<&str> = cfg.repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn invalid_record_only_rejects_itself() {
    let cfg = load_from_str(
        r#"
good:
  source: /srv/good
  destinations: [/dst/good]
no_destinations:
  source: /srv/bad
  destinations: []
missing_source:
  destinations: [/dst]
typo:
  source: /srv/typo
  destinations: [/dst]
  destinaton: oops
"#,
    )
    .unwrap();

    assert_eq!(cfg.repos.len(), 1);
    assert_eq!(cfg.repos[0].name, "good");

    let mut rejected: Vec<&str> = cfg.rejected.iter().map(|r| r.name.as_str()).collect();
    rejected.sort();
    assert_eq!(rejected, vec!["missing_source", "no_destinations", "typo"]);
    assert!(
        cfg.rejected
            .iter()
            .all(|r| matches!(r.error, SyncwatchError::ConfigError(_)))
    );
}

#[test]
fn name_is_not_a_record_field() {
    let result = load_from_str(
        r#"
repo:
  name: other
  source: /srv
  destinations: [/dst]
"#,
    );
    assert!(matches!(result, Err(SyncwatchError::ConfigError(_))));
}

#[test]
fn no_valid_repository_is_fatal() {
    let result = load_from_str("bad: {source: /srv, destinations: []}\n");
    match result {
        Err(SyncwatchError::ConfigError(msg)) => assert!(msg.contains("no valid repository")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn unreadable_document_is_fatal() {
    let result = load_and_validate("/definitely/not/a/config.yaml");
    assert!(result.is_err());

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "repo: [unclosed").unwrap();
    assert!(matches!(
        load_and_validate(file.path()),
        Err(SyncwatchError::YamlError(_))
    ));
}

#[test]
fn source_tilde_is_expanded() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let cfg = load_from_str("r: {source: ~/notes, destinations: [/dst]}\n").unwrap();
    assert_eq!(cfg.repos[0].source, home.join("notes"));
}
