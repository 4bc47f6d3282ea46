//! Operator diagnostics for a scan
//!
//! Nothing that goes wrong inside a single source stops a scan. Each problem
//! is reported here instead: it is logged through `tracing` and recorded so
//! the caller can inspect it once the scan returns.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::GameUri;

/// A non-fatal problem observed while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A map root could not be listed (usually because it does not exist).
    RootUnreadable { root: PathBuf, error: String },
    /// A map folder's `games` directory could not be listed.
    SourceUnreadable { path: PathBuf, error: String },
    /// A map archive could not be opened.
    ArchiveUnreadable { path: PathBuf, error: String },
    /// A listed archive entry could not be read back.
    CorruptArchive { path: PathBuf, entry: String },
    /// The descriptor needs a newer engine.
    VersionMismatch {
        uri: GameUri,
        required: String,
        current: String,
    },
    /// The descriptor is not well-formed.
    MalformedDescriptor {
        uri: GameUri,
        line: u32,
        column: u32,
        message: String,
    },
    /// The descriptor failed to parse for any other reason.
    ParseFailed { uri: GameUri, error: String },
    /// A scan task panicked; its source contributed nothing.
    TaskPanicked { path: PathBuf },
    /// The wait ceiling elapsed with tasks still running.
    WaitExpired { pending: usize, waited: Duration },
}

impl Diagnostic {
    /// Descriptor-level failures (anything that skipped a single document).
    pub fn is_descriptor_failure(&self) -> bool {
        matches!(
            self,
            Diagnostic::VersionMismatch { .. }
                | Diagnostic::MalformedDescriptor { .. }
                | Diagnostic::ParseFailed { .. }
        )
    }

    fn emit(&self) {
        match self {
            Diagnostic::RootUnreadable { root, error } => {
                tracing::debug!(root = %root.display(), %error, "Map root not readable");
            }
            Diagnostic::VersionMismatch { .. } => tracing::info!("{}", self),
            _ => tracing::warn!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RootUnreadable { root, error } => {
                write!(f, "Could not list map root {}: {}", root.display(), error)
            }
            Diagnostic::SourceUnreadable { path, error } => {
                write!(f, "Could not list games in {}: {}", path.display(), error)
            }
            Diagnostic::ArchiveUnreadable { path, error } => {
                write!(f, "Could not open map archive {}: {}", path.display(), error)
            }
            Diagnostic::CorruptArchive { path, entry } => {
                write!(f, "Corrupt map archive {} (entry {})", path.display(), entry)
            }
            Diagnostic::VersionMismatch {
                uri,
                required,
                current,
            } => write!(
                f,
                "Skipping {}: requires engine {} (running {})",
                uri, required, current
            ),
            Diagnostic::MalformedDescriptor {
                uri,
                line,
                column,
                message,
            } => write!(
                f,
                "Could not parse: {} error at line: {} column: {} ({})",
                uri, line, column, message
            ),
            Diagnostic::ParseFailed { uri, error } => {
                write!(f, "Could not parse: {} ({})", uri, error)
            }
            Diagnostic::TaskPanicked { path } => {
                write!(f, "Scan task for {} panicked", path.display())
            }
            Diagnostic::WaitExpired { pending, waited } => write!(
                f,
                "Gave up waiting after {:?} with {} source(s) still scanning",
                waited, pending
            ),
        }
    }
}

/// Shared sink for [`Diagnostic`]s. Cloning shares the underlying record.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a diagnostic.
    pub fn report(&self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }

    /// Everything reported so far, in report order.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
