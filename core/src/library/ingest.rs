//! Turning descriptor documents into catalog entries
//!
//! Every failure is classified, reported and swallowed here: a bad
//! document never affects its siblings.

use std::path::PathBuf;
use std::sync::Arc;

use mapdeck_shared::{DESCRIPTOR_EXTENSION, Descriptor, GAMES_FOLDER};

use super::{
    CatalogEntry, DescriptorError, DescriptorParser, Diagnostic, DiagnosticLog, GameSource,
    GameUri, RootPriority,
};

/// Runs the descriptor parser and classifies its failures.
#[derive(Clone)]
pub struct DescriptorIngestor {
    parser: Arc<dyn DescriptorParser>,
    diagnostics: DiagnosticLog,
}

impl DescriptorIngestor {
    pub fn new(parser: Arc<dyn DescriptorParser>, diagnostics: DiagnosticLog) -> Self {
        Self {
            parser,
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Parse the document at `uri`. Returns `None` (after reporting) if it
    /// does not yield a descriptor.
    pub fn ingest(&self, uri: GameUri, origin: RootPriority) -> Option<CatalogEntry> {
        let parsed = self.parser.parse(&uri);
        self.accept(uri, origin, parsed)
    }

    /// Like [`ingest`](Self::ingest) for a document already read into memory.
    pub fn ingest_bytes(
        &self,
        uri: GameUri,
        bytes: &[u8],
        origin: RootPriority,
    ) -> Option<CatalogEntry> {
        let parsed = self.parser.parse_bytes(&uri, bytes);
        self.accept(uri, origin, parsed)
    }

    fn accept(
        &self,
        uri: GameUri,
        origin: RootPriority,
        parsed: Result<Descriptor, DescriptorError>,
    ) -> Option<CatalogEntry> {
        match parsed {
            Ok(descriptor) => {
                tracing::debug!(uri = %uri, name = %descriptor.name, "Parsed descriptor");
                Some(CatalogEntry::new(descriptor, uri, origin))
            }
            Err(DescriptorError::EngineVersion { required, current }) => {
                self.diagnostics.report(Diagnostic::VersionMismatch {
                    uri,
                    required: required.to_string(),
                    current: current.to_string(),
                });
                None
            }
            Err(DescriptorError::Malformed {
                line,
                column,
                message,
            }) => {
                self.diagnostics.report(Diagnostic::MalformedDescriptor {
                    uri,
                    line,
                    column,
                    message,
                });
                None
            }
            Err(DescriptorError::Other(error)) => {
                self.diagnostics.report(Diagnostic::ParseFailed {
                    uri,
                    error: format!("{:#}", error),
                });
                None
            }
        }
    }

    /// Ingest into `entries`, skipping the result if an equal entry is
    /// already there. Returns whether an entry was added.
    pub fn ingest_into(
        &self,
        uri: GameUri,
        origin: RootPriority,
        entries: &mut Vec<CatalogEntry>,
    ) -> bool {
        push_unique(self.ingest(uri, origin), entries)
    }

    /// [`ingest_into`](Self::ingest_into) for in-memory bytes.
    pub fn ingest_bytes_into(
        &self,
        uri: GameUri,
        bytes: &[u8],
        origin: RootPriority,
        entries: &mut Vec<CatalogEntry>,
    ) -> bool {
        push_unique(self.ingest_bytes(uri, bytes, origin), entries)
    }

    /// Ingest every `.xml` file directly inside a map folder's `games/`
    /// subfolder. A folder without one is not a map and yields nothing.
    pub fn ingest_directory(&self, source: &GameSource) -> Vec<CatalogEntry> {
        let games_dir = source.path().join(GAMES_FOLDER);
        if !games_dir.is_dir() {
            tracing::debug!(path = %source.path().display(), "No games folder, skipping");
            return Vec::new();
        }

        let listing = match std::fs::read_dir(&games_dir) {
            Ok(listing) => listing,
            Err(e) => {
                self.diagnostics.report(Diagnostic::SourceUnreadable {
                    path: games_dir,
                    error: e.to_string(),
                });
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = listing
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && is_descriptor_file(path))
            .collect();
        files.sort();

        let mut entries = Vec::new();
        for file in files {
            self.ingest_into(GameUri::from_file(&file), source.priority(), &mut entries);
        }
        entries
    }
}

fn push_unique(entry: Option<CatalogEntry>, entries: &mut Vec<CatalogEntry>) -> bool {
    match entry {
        Some(entry) if !entries.contains(&entry) => {
            entries.push(entry);
            true
        }
        Some(entry) => {
            tracing::debug!(name = entry.name(), uri = %entry.uri(), "Dropping duplicate descriptor");
            false
        }
        None => false,
    }
}

fn is_descriptor_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
}
