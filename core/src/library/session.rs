//! The currently selected map and its resources
//!
//! A [`MapSession`] is owned by whoever drives game selection. Switching
//! maps releases the previous map's loader (closing its archive) and
//! forgets every resource lookup made through it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hashbrown::HashMap;

use mapdeck_shared::GAMES_FOLDER;

use super::{ArchiveError, ArchiveResourceRoot, CatalogEntry, GameUri, UriLocation};

/// Resolves resources by name relative to one map.
#[derive(Debug)]
pub enum MapResourceLoader {
    /// Map unpacked into a folder.
    Directory { root: PathBuf },
    /// Map packed in a zip archive.
    Archive(ArchiveResourceRoot),
}

impl MapResourceLoader {
    pub fn for_directory(root: impl Into<PathBuf>) -> Self {
        MapResourceLoader::Directory { root: root.into() }
    }

    pub fn for_archive(path: &Path) -> Result<Self, ArchiveError> {
        ArchiveResourceRoot::open(path).map(MapResourceLoader::Archive)
    }

    /// Loader for the map a catalog entry was parsed from.
    ///
    /// Loose descriptors live in `<map>/games/<file>.xml`, so the map root
    /// is two levels up.
    pub fn for_entry(entry: &CatalogEntry) -> Result<Self> {
        match entry.uri().location()? {
            UriLocation::ArchiveEntry { archive, .. } => Ok(Self::for_archive(&archive)?),
            UriLocation::File(path) => {
                let root = path
                    .parent()
                    .filter(|games| games.file_name().is_some_and(|n| n == GAMES_FOLDER))
                    .and_then(Path::parent)
                    .with_context(|| {
                        format!("{} is not inside a map's games folder", path.display())
                    })?;
                Ok(Self::for_directory(root))
            }
        }
    }

    /// Folder or archive the map lives in.
    pub fn root(&self) -> &Path {
        match self {
            MapResourceLoader::Directory { root } => root,
            MapResourceLoader::Archive(archive) => archive.path(),
        }
    }

    /// URI of the resource `name` (a `/`-separated relative path), if the
    /// map has it.
    pub fn resource(&self, name: &str) -> Option<GameUri> {
        match self {
            MapResourceLoader::Directory { root } => {
                let path = name
                    .split('/')
                    .filter(|part| !part.is_empty())
                    .fold(root.clone(), |path, part| path.join(part));
                path.exists().then(|| GameUri::from_file(&path))
            }
            MapResourceLoader::Archive(archive) => archive.locate(name),
        }
    }
}

/// Resource context of the selected map.
#[derive(Debug, Default)]
pub struct MapSession {
    loader: Option<MapResourceLoader>,
    cache: HashMap<String, Option<GameUri>>,
}

impl MapSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the current map, then adopt `loader`.
    pub fn switch_context(&mut self, loader: MapResourceLoader) {
        self.release();
        tracing::debug!(root = %loader.root().display(), "Switched map context");
        self.loader = Some(loader);
    }

    /// Drop the current loader and every cached lookup.
    pub fn release(&mut self) {
        if let Some(previous) = self.loader.take() {
            tracing::debug!(root = %previous.root().display(), "Released map context");
        }
        self.cache.clear();
    }

    pub fn loader(&self) -> Option<&MapResourceLoader> {
        self.loader.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loader.is_some()
    }

    /// Resolve `name` against the current map, caching the answer
    /// (including "absent") until the next switch.
    pub fn resource(&mut self, name: &str) -> Option<GameUri> {
        let loader = self.loader.as_ref()?;
        self.cache
            .entry(name.to_string())
            .or_insert_with(|| loader.resource(name))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::RootPriority;
    use mapdeck_shared::Descriptor;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn directory_map(dir: &TempDir) -> PathBuf {
        let root = dir.path().join("revised");
        fs::create_dir_all(root.join("games")).unwrap();
        fs::write(root.join("games").join("revised.xml"), "<game/>").unwrap();
        fs::write(root.join("map.properties"), "").unwrap();
        root
    }

    fn archive_map(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("pacific.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        for name in ["games/pacific.xml", "sounds.properties"] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(b"x").unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_loader_for_directory_entry() {
        let dir = TempDir::new().unwrap();
        let root = directory_map(&dir);
        let entry = CatalogEntry::new(
            Descriptor::new("Revised"),
            GameUri::from_file(&root.join("games").join("revised.xml")),
            RootPriority::User,
        );

        let loader = MapResourceLoader::for_entry(&entry).unwrap();
        assert_eq!(loader.root(), root);
        assert!(loader.resource("map.properties").is_some());
        assert!(loader.resource("games/").is_some());
        assert!(loader.resource("sounds.properties").is_none());
    }

    #[test]
    fn test_loader_for_archive_entry() {
        let dir = TempDir::new().unwrap();
        let path = archive_map(&dir);
        let entry = CatalogEntry::new(
            Descriptor::new("Pacific"),
            GameUri::archive_entry(&path, "games/pacific.xml"),
            RootPriority::Default,
        );

        let loader = MapResourceLoader::for_entry(&entry).unwrap();
        assert_eq!(loader.root(), path);
        let uri = loader.resource("sounds.properties").unwrap();
        assert!(uri.as_str().ends_with("pacific.zip!/sounds.properties"));
        assert!(loader.resource("map.properties").is_none());
    }

    #[test]
    fn test_loose_file_outside_games_folder() {
        let entry = CatalogEntry::new(
            Descriptor::new("Stray"),
            GameUri::from_file(Path::new("/maps/stray.xml")),
            RootPriority::Default,
        );
        assert!(MapResourceLoader::for_entry(&entry).is_err());
    }

    #[test]
    fn test_switch_context_releases_previous() {
        let dir = TempDir::new().unwrap();
        let first = directory_map(&dir);
        let second = archive_map(&dir);

        let mut session = MapSession::new();
        assert!(!session.is_loaded());
        assert!(session.resource("map.properties").is_none());

        session.switch_context(MapResourceLoader::for_directory(&first));
        assert!(session.resource("map.properties").is_some());

        session.switch_context(MapResourceLoader::for_archive(&second).unwrap());
        assert_eq!(session.loader().unwrap().root(), second);
        // cached answer from the first map must not leak through
        assert!(session.resource("map.properties").is_none());
        assert!(session.resource("sounds.properties").is_some());

        session.release();
        assert!(!session.is_loaded());
        assert!(session.resource("sounds.properties").is_none());
    }

    #[test]
    fn test_lookups_are_cached() {
        let dir = TempDir::new().unwrap();
        let root = directory_map(&dir);
        let mut session = MapSession::new();
        session.switch_context(MapResourceLoader::for_directory(&root));

        assert!(session.resource("map.properties").is_some());
        fs::remove_file(root.join("map.properties")).unwrap();
        assert!(session.resource("map.properties").is_some());
    }
}
