//! The deduplicated, sorted game catalog

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;

use mapdeck_shared::Descriptor;

use super::{GameUri, RootPriority};

/// A successfully parsed descriptor and where it came from.
///
/// Identity is the game name: two entries with the same name are the same
/// game for deduplication and removal, whichever source they came from.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    descriptor: Arc<Descriptor>,
    uri: GameUri,
    origin: RootPriority,
}

impl CatalogEntry {
    pub fn new(descriptor: Descriptor, uri: GameUri, origin: RootPriority) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            uri,
            origin,
        }
    }

    /// Display name, taken from the descriptor.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn uri(&self) -> &GameUri {
        &self.uri
    }

    pub fn origin(&self) -> RootPriority {
        self.origin
    }

    /// Catalog display order: case-insensitive name, with exact name and
    /// then URI as tie-breakers so the order is total.
    pub fn catalog_order(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.uri.cmp(&b.uri))
    }
}

impl PartialEq for CatalogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for CatalogEntry {}

impl Hash for CatalogEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

/// The catalog exposed to consumers.
///
/// Built once from a scan's accumulated entries; afterwards the only
/// mutation is explicit removal.
#[derive(Debug, Clone, Default)]
pub struct CatalogModel {
    entries: Vec<CatalogEntry>,
}

impl CatalogModel {
    /// Sort `entries` into catalog order and drop duplicates, keeping the
    /// first entry of each name in that order.
    pub fn build(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut entries: Vec<CatalogEntry> = entries.into_iter().collect();
        entries.sort_by(CatalogEntry::catalog_order);
        entries.dedup();
        Self { entries }
    }

    /// First entry whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Remove the entry equal to `entry`. Returns whether one was present.
    pub fn remove(&mut self, entry: &CatalogEntry) -> bool {
        match self.entries.iter().position(|e| e == entry) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(CatalogEntry::name).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a CatalogModel {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
