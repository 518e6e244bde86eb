use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Flags controlling how plugin results are merged into entities.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PluginsConfig {
    /// Let plugin-supplied covers replace covers a movie already has.
    #[serde(default)]
    pub allow_movie_thumbnail_overwrite: bool,
    /// Create a studio when a plugin names one that matches nothing.
    #[serde(default)]
    pub create_missing_studios: bool,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("marquee.db")
}

/// Library (media root) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Root directory; downloaded images land in `<path>/images`.
    #[serde(default = "default_library_path")]
    pub path: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: default_library_path(),
        }
    }
}

impl LibraryConfig {
    /// Resolve a path relative to the library root.
    pub fn library_path(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }
}

fn default_library_path() -> PathBuf {
    PathBuf::from("library")
}
