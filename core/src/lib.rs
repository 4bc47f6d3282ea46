//! mapdeck core - game map discovery
//!
//! This crate finds playable game definitions shipped as loose map folders
//! or zip archives, parses their descriptors, and builds a deduplicated,
//! sorted catalog.
//!
//! # Architecture
//!
//! - [`library::enumerate_sources`] - lists candidate map sources from the user and default roots
//! - [`library::ArchiveResourceRoot`] - opens a map archive and resolves entries to [`library::GameUri`]s
//! - [`library::DescriptorIngestor`] - parses one descriptor into zero or one catalog entry
//! - [`library::CorruptionRecoveryGate`] - offers to delete archives whose entries cannot be read
//! - [`library::ScanCoordinator`] - runs the per-source work on a bounded worker pool
//! - [`library::CatalogModel`] - the deduplicated, sorted result

pub mod app;
pub mod library;

pub use app::Config;
pub use library::{
    CancellationToken, CatalogEntry, CatalogModel, MapRoots, MapRootsProvider, ScanCoordinator,
    ScanOptions, ScanReport, ScanState, XmlDescriptorParser,
};
