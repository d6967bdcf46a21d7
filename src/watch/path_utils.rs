// src/watch/path_utils.rs

//! Path helpers for matching event paths against repository patterns.

use std::path::Path;

use crate::fs::FileSystem;

/// Express `path` relative to `root`, with forward slashes.
///
/// A plain `strip_prefix` is tried first. When that fails (symlinked roots,
/// `/private/var` vs `/var` on macOS, ...) both sides are canonicalised and
/// stripped again. Paths that no longer exist cannot be canonicalised, so a
/// deleted file under a symlinked root falls through to `None`.
pub fn relative_str(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = fs.canonicalize(root).ok()?;
    let path_canon = fs.canonicalize(path).ok()?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn strips_root() {
        let fs = MockFileSystem::new();
        assert_eq!(
            relative_str(&fs, Path::new("/repo"), Path::new("/repo/src/main.go")).as_deref(),
            Some("src/main.go")
        );
    }

    #[test]
    fn unrelated_path_is_none() {
        let fs = MockFileSystem::new();
        fs.add_dir("/repo");
        assert_eq!(
            relative_str(&fs, Path::new("/repo"), Path::new("/elsewhere/missing")),
            None
        );
    }

    #[test]
    fn symlinked_root_falls_back_to_canonical_paths() {
        let fs = MockFileSystem::new();
        fs.add_file("/private/var/repo/src/lib.rs", "");
        fs.add_link("/var", "/private/var");

        assert_eq!(
            relative_str(
                &fs,
                Path::new("/var/repo"),
                Path::new("/private/var/repo/src/lib.rs")
            )
            .as_deref(),
            Some("src/lib.rs")
        );
    }

    #[test]
    fn deleted_file_under_symlinked_root_is_none() {
        let fs = MockFileSystem::new();
        fs.add_dir("/private/var/repo");
        fs.add_link("/var", "/private/var");

        assert_eq!(
            relative_str(&fs, Path::new("/var/repo"), Path::new("/private/var/repo/gone.rs")),
            None
        );
    }
}
