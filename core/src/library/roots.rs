//! Map root folders

use std::path::PathBuf;

/// The two folders scanned for maps, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapRoots {
    /// Maps the user installed. Scanned first.
    pub user: Option<PathBuf>,
    /// Maps shipped with the installation.
    pub default: Option<PathBuf>,
}

impl MapRoots {
    pub fn new(user: impl Into<Option<PathBuf>>, default: impl Into<Option<PathBuf>>) -> Self {
        Self {
            user: user.into(),
            default: default.into(),
        }
    }
}

/// Trait for providing the map root folders.
///
/// The catalog code never decides where maps live; the application's
/// configuration (or a test) does.
///
/// # Example
///
/// ```rust,ignore
/// use mapdeck_core::library::MapRootsProvider;
/// use std::path::PathBuf;
///
/// struct InstallRoots;
///
/// impl MapRootsProvider for InstallRoots {
///     fn user_maps_dir(&self) -> Option<PathBuf> {
///         directories::ProjectDirs::from("io.mapdeck", "", "Mapdeck")
///             .map(|dirs| dirs.data_dir().join("maps"))
///     }
///     fn default_maps_dir(&self) -> Option<PathBuf> {
///         Some(PathBuf::from("maps"))
///     }
/// }
/// ```
pub trait MapRootsProvider: Send + Sync {
    /// Folder with user-installed maps, or `None` if the platform has none.
    fn user_maps_dir(&self) -> Option<PathBuf>;

    /// Folder with the maps bundled with the installation.
    fn default_maps_dir(&self) -> Option<PathBuf>;

    /// Both roots, user first.
    fn roots(&self) -> MapRoots {
        MapRoots {
            user: self.user_maps_dir(),
            default: self.default_maps_dir(),
        }
    }
}

impl MapRootsProvider for MapRoots {
    fn user_maps_dir(&self) -> Option<PathBuf> {
        self.user.clone()
    }

    fn default_maps_dir(&self) -> Option<PathBuf> {
        self.default.clone()
    }
}
