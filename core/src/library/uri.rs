//! Byte-addressable locations of descriptor documents.
//!
//! A [`GameUri`] names either a loose file (`file:///maps/x/games/x.xml`) or
//! an entry inside a map archive (`jar:file:///maps/x.zip!/games/x.xml`).
//! Spaces are percent-encoded as `%20` and percent signs as `%25`; nothing
//! else is escaped.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;

use mapdeck_shared::{read_file_with_limit, read_to_end_with_limit};

const FILE_SCHEME: &str = "file://";
const ARCHIVE_SCHEME: &str = "jar:file://";
const ENTRY_SEPARATOR: &str = "!/";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("unsupported URI scheme: {0}")]
    UnsupportedScheme(String),
    #[error("archive URI has no entry part: {0}")]
    MissingEntry(String),
}

/// Where a [`GameUri`] points, with percent-encoding undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriLocation {
    File(PathBuf),
    ArchiveEntry { archive: PathBuf, entry: String },
}

/// Canonical location of a descriptor document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GameUri(String);

impl GameUri {
    /// URI of a loose file. Relative paths are made absolute first.
    pub fn from_file(path: &Path) -> Self {
        Self(encode(&format!(
            "{}{}",
            FILE_SCHEME,
            uri_path(&absolute(path))
        )))
    }

    /// URI of `entry` inside the archive at `archive`.
    pub fn archive_entry(archive: &Path, entry: &str) -> Self {
        Self(encode(&format!(
            "{}{}{}{}",
            ARCHIVE_SCHEME,
            uri_path(&absolute(archive)),
            ENTRY_SEPARATOR,
            entry
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the URI back into a filesystem location.
    pub fn location(&self) -> Result<UriLocation, UriError> {
        let decoded = decode(&self.0);
        if let Some(rest) = decoded.strip_prefix(ARCHIVE_SCHEME) {
            let (archive, entry) = rest
                .split_once(ENTRY_SEPARATOR)
                .ok_or_else(|| UriError::MissingEntry(self.0.clone()))?;
            return Ok(UriLocation::ArchiveEntry {
                archive: fs_path(archive),
                entry: entry.to_string(),
            });
        }
        if let Some(rest) = decoded.strip_prefix(FILE_SCHEME) {
            return Ok(UriLocation::File(fs_path(rest)));
        }
        Err(UriError::UnsupportedScheme(self.0.clone()))
    }

    /// Read the document's bytes, refusing anything over `max_bytes`.
    pub fn read_bytes(&self, max_bytes: u64) -> Result<Vec<u8>> {
        match self.location()? {
            UriLocation::File(path) => read_file_with_limit(&path, max_bytes),
            UriLocation::ArchiveEntry { archive, entry } => {
                let file = File::open(&archive)
                    .with_context(|| format!("Failed to open archive: {}", archive.display()))?;
                let mut zip = zip::ZipArchive::new(BufReader::new(file))
                    .with_context(|| format!("Failed to read archive: {}", archive.display()))?;
                let reader = zip.by_name(&entry).with_context(|| {
                    format!("Missing entry {} in {}", entry, archive.display())
                })?;
                read_to_end_with_limit(reader, max_bytes)
                    .with_context(|| format!("Failed to read {}", self))
            }
        }
    }
}

impl fmt::Display for GameUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn encode(uri: &str) -> String {
    uri.replace('%', "%25").replace(' ', "%20")
}

/// Undo [`encode`]. Other `%` sequences are left as they are.
fn decode(uri: &str) -> String {
    let mut decoded = String::with_capacity(uri.len());
    let mut rest = uri;
    while let Some(at) = rest.find('%') {
        decoded.push_str(&rest[..at]);
        let escape = &rest[at..];
        if let Some(tail) = escape.strip_prefix("%20") {
            decoded.push(' ');
            rest = tail;
        } else if let Some(tail) = escape.strip_prefix("%25") {
            decoded.push('%');
            rest = tail;
        } else {
            decoded.push('%');
            rest = &escape[1..];
        }
    }
    decoded.push_str(rest);
    decoded
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Forward-slash path with a leading `/`, as it appears after `file://`.
fn uri_path(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

fn fs_path(uri_path: &str) -> PathBuf {
    // `/C:/maps` -> `C:/maps`
    #[cfg(windows)]
    if uri_path.as_bytes().get(2) == Some(&b':') {
        return PathBuf::from(&uri_path[1..]);
    }
    PathBuf::from(uri_path)
}
