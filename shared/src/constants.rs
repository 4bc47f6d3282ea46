//! Centralized constants for map discovery.

/// Folder inside a map that holds game descriptor documents.
pub const GAMES_FOLDER: &str = "games";

/// Archive entry prefix for descriptor documents. Entry names always use `/`.
pub const GAMES_ENTRY_PREFIX: &str = "games/";

/// File extension of descriptor documents (compared case-insensitively).
pub const DESCRIPTOR_EXTENSION: &str = "xml";

/// File extension of map archives (compared case-insensitively).
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Name of the maps folder below the installation root.
pub const MAPS_FOLDER: &str = "maps";

/// Default ceiling for waiting on in-flight scan tasks, in seconds.
pub const DEFAULT_MAX_WAIT_SECS: u64 = 5 * 60;

/// Well-known resources a map may ship next to its descriptors.
pub const WELL_KNOWN_MAP_RESOURCES: &[&str] = &["map.properties", "sounds.properties"];
