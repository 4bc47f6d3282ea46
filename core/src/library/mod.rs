//! Game catalog discovery
//!
//! Finds game descriptors under the user and default map roots, parses them,
//! and merges the results into one sorted catalog.

mod archive;
mod catalog;
mod descriptor;
mod diagnostics;
mod ingest;
mod interaction;
mod recovery;
mod resolver;
mod roots;
mod scan;
mod session;
mod source;
mod uri;

pub use archive::{
    ArchiveError, ArchiveResourceRoot, ArchiveScan, ResolvedEntry, is_descriptor_entry,
    read_archive,
};
pub use catalog::{CatalogEntry, CatalogModel};
pub use descriptor::{DescriptorError, DescriptorParser, XmlDescriptorParser};
pub use diagnostics::{Diagnostic, DiagnosticLog};
pub use ingest::DescriptorIngestor;
pub use interaction::{
    AutoDecline, Interaction, InteractionError, InteractionExecutor, InteractionHandle,
    InteractionRequest, InteractionResponse, Severity,
};
pub use recovery::{CorruptionRecoveryGate, RecoveryOutcome};
pub use resolver::{NameResolutionError, resolve_game_name};
pub use roots::{MapRoots, MapRootsProvider};
pub use scan::{
    CancellationToken, ScanCoordinator, ScanOptions, ScanReport, ScanState, default_worker_count,
};
pub use session::{MapResourceLoader, MapSession};
pub use source::{GameSource, RootPriority, SourceKind, enumerate_sources};
pub use uri::{GameUri, UriError, UriLocation};
