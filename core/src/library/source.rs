//! Candidate map sources
//!
//! A map is either a folder (with a `games/` subfolder of descriptors) or a
//! `.zip` archive. Sources are listed one level deep under each root, user
//! root first; nothing is deduplicated here.

use std::path::{Path, PathBuf};

use serde::Serialize;

use mapdeck_shared::ARCHIVE_EXTENSION;

use super::{Diagnostic, DiagnosticLog, MapRoots};

/// Which root a source (and every entry parsed from it) came from.
///
/// Declared in priority order: `User` sorts before `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootPriority {
    User,
    Default,
}

impl RootPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootPriority::User => "user",
            RootPriority::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Directory,
    Archive,
}

/// A discovered candidate container of descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSource {
    path: PathBuf,
    kind: SourceKind,
    priority: RootPriority,
}

impl GameSource {
    /// Classify a root entry. Returns `None` for anything that is neither a
    /// directory nor a `.zip` file; such entries are ignored.
    pub fn classify(path: PathBuf, priority: RootPriority) -> Option<Self> {
        let kind = if path.is_dir() {
            SourceKind::Directory
        } else if path.is_file() && has_archive_extension(&path) {
            SourceKind::Archive
        } else {
            return None;
        };
        Some(Self {
            path,
            kind,
            priority,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn priority(&self) -> RootPriority {
        self.priority
    }
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// List every source under the user root, then every source under the
/// default root. A missing or unreadable root contributes nothing.
pub fn enumerate_sources(roots: &MapRoots, diagnostics: &DiagnosticLog) -> Vec<GameSource> {
    let mut sources = Vec::new();
    if let Some(user) = &roots.user {
        sources.extend(list_root(user, RootPriority::User, diagnostics));
    }
    if let Some(default) = &roots.default {
        sources.extend(list_root(default, RootPriority::Default, diagnostics));
    }
    sources
}

fn list_root(root: &Path, priority: RootPriority, diagnostics: &DiagnosticLog) -> Vec<GameSource> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            diagnostics.report(Diagnostic::RootUnreadable {
                root: root.to_path_buf(),
                error: e.to_string(),
            });
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    // read_dir order is platform-dependent
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| GameSource::classify(path, priority))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn roots(user: &Path, default: &Path) -> MapRoots {
        MapRoots::new(user.to_path_buf(), default.to_path_buf())
    }

    // =============================================================
    // classify tests
    // =============================================================

    #[test]
    fn test_classify_directory_and_zip() {
        let dir = TempDir::new().unwrap();
        let map_dir = dir.path().join("revised");
        fs::create_dir(&map_dir).unwrap();
        let zip = dir.path().join("Pacific.ZIP");
        fs::write(&zip, b"PK").unwrap();

        let source = GameSource::classify(map_dir.clone(), RootPriority::User).unwrap();
        assert_eq!(source.kind(), SourceKind::Directory);
        assert_eq!(source.path(), map_dir);

        let source = GameSource::classify(zip, RootPriority::Default).unwrap();
        assert_eq!(source.kind(), SourceKind::Archive);
        assert_eq!(source.priority(), RootPriority::Default);
    }

    #[test]
    fn test_classify_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        let notes = dir.path().join("readme.txt");
        fs::write(&notes, b"hello").unwrap();
        assert!(GameSource::classify(notes, RootPriority::User).is_none());
        assert!(GameSource::classify(dir.path().join("missing.zip"), RootPriority::User).is_none());
    }

    // =============================================================
    // enumerate_sources tests
    // =============================================================

    #[test]
    fn test_user_root_listed_first() {
        let user = TempDir::new().unwrap();
        let default = TempDir::new().unwrap();
        fs::create_dir(default.path().join("aaa")).unwrap();
        fs::create_dir(user.path().join("zzz")).unwrap();
        fs::write(user.path().join("mid.zip"), b"PK").unwrap();

        let log = DiagnosticLog::new();
        let sources = enumerate_sources(&roots(user.path(), default.path()), &log);
        let priorities: Vec<RootPriority> = sources.iter().map(|s| s.priority()).collect();
        assert_eq!(
            priorities,
            vec![RootPriority::User, RootPriority::User, RootPriority::Default]
        );
        assert!(log.is_empty());
    }

    #[test]
    fn test_duplicate_names_both_forwarded() {
        let user = TempDir::new().unwrap();
        let default = TempDir::new().unwrap();
        fs::create_dir(user.path().join("global_war")).unwrap();
        fs::create_dir(default.path().join("global_war")).unwrap();

        let sources = enumerate_sources(&roots(user.path(), default.path()), &DiagnosticLog::new());
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_does_not_recurse() {
        let user = TempDir::new().unwrap();
        fs::create_dir_all(user.path().join("outer").join("inner")).unwrap();
        fs::write(user.path().join("outer").join("nested.zip"), b"PK").unwrap();

        let sources = enumerate_sources(
            &MapRoots::new(user.path().to_path_buf(), None::<PathBuf>),
            &DiagnosticLog::new(),
        );
        assert_eq!(sources.len(), 1);
        assert!(sources[0].path().ends_with("outer"));
    }

    #[test]
    fn test_missing_roots_yield_nothing() {
        let log = DiagnosticLog::new();
        let sources = enumerate_sources(
            &roots(Path::new("/nonexistent/user/maps"), Path::new("/nonexistent/maps")),
            &log,
        );
        assert!(sources.is_empty());
        assert_eq!(log.len(), 2);
        assert!(matches!(log.snapshot()[0], Diagnostic::RootUnreadable { .. }));
    }

    #[test]
    fn test_no_roots_configured() {
        let sources = enumerate_sources(&MapRoots::default(), &DiagnosticLog::new());
        assert!(sources.is_empty());
    }
}
