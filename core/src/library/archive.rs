//! Map archives as resource roots
//!
//! An archive is opened once per scan task. Descriptor entries live under
//! `games/`; every other entry is a map resource looked up by relative
//! name. A listed entry whose bytes cannot be read back marks the whole
//! archive as corrupt.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

use mapdeck_shared::{DESCRIPTOR_EXTENSION, GAMES_ENTRY_PREFIX, MAX_DESCRIPTOR_BYTES};

use super::{CatalogEntry, DescriptorIngestor, Diagnostic, GameSource, GameUri};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a readable zip archive: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

/// Whether an archive entry name is a descriptor document.
pub fn is_descriptor_entry(name: &str) -> bool {
    name.starts_with(GAMES_ENTRY_PREFIX)
        && name
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", DESCRIPTOR_EXTENSION))
}

/// An entry that was read through and passed its checksum.
#[derive(Debug)]
pub struct ResolvedEntry {
    pub uri: GameUri,
    /// The entry's content, or `None` if it is larger than the limit.
    pub bytes: Option<Vec<u8>>,
}

/// An open zip archive that resolves entries by relative name.
///
/// The file handle is released when the root is dropped.
pub struct ArchiveResourceRoot {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl std::fmt::Debug for ArchiveResourceRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveResourceRoot")
            .field("path", &self.path)
            .field("entries", &self.zip.len())
            .finish()
    }
}

impl ArchiveResourceRoot {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let zip = ZipArchive::new(BufReader::new(file)).map_err(|source| ArchiveError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the descriptor entries, sorted.
    pub fn descriptor_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .zip
            .file_names()
            .filter(|name| is_descriptor_entry(name))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// Whether the archive has an entry called `name`. A name ending in `/`
    /// matches any entry under that folder.
    pub fn contains(&self, name: &str) -> bool {
        if name.ends_with('/') {
            self.zip.file_names().any(|entry| entry.starts_with(name))
        } else {
            self.zip.file_names().any(|entry| entry == name)
        }
    }

    /// URI of `name` without reading it.
    pub fn locate(&self, name: &str) -> Option<GameUri> {
        self.contains(name)
            .then(|| GameUri::archive_entry(&self.path, name))
    }

    /// Read `name` through to verify its checksum, keeping its content if
    /// it is at most `max_bytes` long. `None` means the entry is missing or
    /// its bytes are bad.
    pub fn resolve(&mut self, name: &str, max_bytes: u64) -> Option<ResolvedEntry> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(archive = %self.path.display(), entry = name, error = %e, "Entry lookup failed");
                return None;
            }
        };
        let mut bytes = Vec::new();
        if let Err(e) = (&mut entry)
            .take(max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
        {
            tracing::debug!(archive = %self.path.display(), entry = name, error = %e, "Entry read failed");
            return None;
        }
        // drain the rest so the checksum is still checked
        if let Err(e) = io::copy(&mut entry, &mut io::sink()) {
            tracing::debug!(archive = %self.path.display(), entry = name, error = %e, "Entry read failed");
            return None;
        }
        Some(ResolvedEntry {
            uri: GameUri::archive_entry(&self.path, name),
            bytes: (bytes.len() as u64 <= max_bytes).then_some(bytes),
        })
    }
}

/// What scanning one archive produced.
#[derive(Debug)]
pub enum ArchiveScan {
    /// Entries parsed from every descriptor (possibly none).
    Entries(Vec<CatalogEntry>),
    /// `entry` could not be resolved; nothing from the archive is kept.
    Corrupt { entry: String },
    /// The archive could not be opened at all.
    Unreadable,
}

/// Scan an archive source. Problems are reported to the ingestor's
/// diagnostics; corruption is returned so the caller can start recovery.
pub fn read_archive(source: &GameSource, ingestor: &DescriptorIngestor) -> ArchiveScan {
    let mut root = match ArchiveResourceRoot::open(source.path()) {
        Ok(root) => root,
        Err(e) => {
            ingestor.diagnostics().report(Diagnostic::ArchiveUnreadable {
                path: source.path().to_path_buf(),
                error: e.to_string(),
            });
            return ArchiveScan::Unreadable;
        }
    };

    let mut entries = Vec::new();
    for name in root.descriptor_entries() {
        let Some(ResolvedEntry { uri, bytes }) = root.resolve(&name, MAX_DESCRIPTOR_BYTES) else {
            ingestor.diagnostics().report(Diagnostic::CorruptArchive {
                path: source.path().to_path_buf(),
                entry: name.clone(),
            });
            return ArchiveScan::Corrupt { entry: name };
        };
        match bytes {
            Some(bytes) => {
                ingestor.ingest_bytes_into(uri, &bytes, source.priority(), &mut entries);
            }
            None => ingestor.diagnostics().report(Diagnostic::ParseFailed {
                uri,
                error: format!("larger than {} bytes", MAX_DESCRIPTOR_BYTES),
            }),
        }
    }
    ArchiveScan::Entries(entries)
}
