//! Plugin host interface and the capabilities handed to running plugins.
//!
//! A plugin run receives a snapshot of the entity and an
//! [`ImageCapabilities`] object. The only way a plugin can attach an image to
//! an entity is by calling one of those capabilities during the run and
//! returning the id it was given.

mod capabilities;
mod value;

pub use capabilities::{extension_from_url, HttpImageDownloader, ImageDownloader, LibraryImageCapabilities};
pub use value::{PluginResult, PluginValue};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::store::{Movie, StoreError};

/// Event fired after a movie is created.
pub const MOVIE_CREATED_EVENT: &str = "movieCreated";

/// Errors raised by plugin runs and plugin capabilities.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Plugin execution failed: {0}")]
    Execution(String),

    #[error("Image download failed: {0}")]
    Download(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Serializable input given to plugins for movie events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInput {
    pub movie: Movie,
    pub movie_name: String,
}

impl PluginInput {
    pub fn for_movie(movie: &Movie) -> Self {
        Self {
            movie: movie.clone(),
            movie_name: movie.name.clone(),
        }
    }
}

/// Side-effecting operations a plugin may invoke while it runs.
///
/// Both return the id of the persisted image record.
#[async_trait]
pub trait ImageCapabilities: Send + Sync {
    /// Download `url` into the library and record it as an image.
    async fn create_image(
        &self,
        url: &str,
        name: &str,
        thumbnail: bool,
    ) -> Result<String, PluginError>;

    /// Record an image that already exists at `path`.
    async fn create_local_image(
        &self,
        path: &str,
        name: &str,
        thumbnail: bool,
    ) -> Result<String, PluginError>;
}

/// Runs every plugin registered for an event and merges their output.
#[async_trait]
pub trait PluginHost: Send + Sync {
    async fn run(
        &self,
        event: &str,
        input: PluginInput,
        capabilities: Arc<dyn ImageCapabilities>,
    ) -> Result<PluginResult, PluginError>;
}
