//! Mock plugin host and image downloader for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::plugin::{
    ImageCapabilities, ImageDownloader, PluginError, PluginHost, PluginInput, PluginResult,
};

/// A recorded plugin run for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPluginRun {
    pub event: String,
    /// The input exactly as a plugin would receive it.
    pub input: serde_json::Value,
}

/// An image a scripted plugin creates through its capabilities.
///
/// The returned id is stored in the result under `field`.
#[derive(Debug, Clone)]
pub enum ScriptedImage {
    Remote {
        url: String,
        name: String,
        thumbnail: bool,
        field: String,
    },
    Local {
        path: String,
        name: String,
        thumbnail: bool,
        field: String,
    },
}

/// Scriptable implementation of the PluginHost trait.
///
/// Each run:
/// 1. Fails with the injected error, if one is set
/// 2. Invokes the capabilities for every scripted image, in order
/// 3. Returns the configured result plus the created image ids
#[derive(Debug, Clone, Default)]
pub struct MockPluginHost {
    result: Arc<RwLock<PluginResult>>,
    images: Arc<RwLock<Vec<ScriptedImage>>>,
    runs: Arc<RwLock<Vec<RecordedPluginRun>>>,
    next_error: Arc<RwLock<Option<PluginError>>>,
}

impl MockPluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result returned by every run.
    pub async fn set_result(&self, result: PluginResult) {
        *self.result.write().await = result;
    }

    /// Create an image during every run.
    pub async fn add_image(&self, image: ScriptedImage) {
        self.images.write().await.push(image);
    }

    /// Get all recorded runs.
    pub async fn recorded_runs(&self) -> Vec<RecordedPluginRun> {
        self.runs.read().await.clone()
    }

    /// Configure the next run to fail with the given error.
    pub async fn set_next_error(&self, error: PluginError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<PluginError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl PluginHost for MockPluginHost {
    async fn run(
        &self,
        event: &str,
        input: PluginInput,
        capabilities: Arc<dyn ImageCapabilities>,
    ) -> Result<PluginResult, PluginError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let input = serde_json::to_value(&input)
            .map_err(|e| PluginError::Execution(e.to_string()))?;
        self.runs.write().await.push(RecordedPluginRun {
            event: event.to_string(),
            input,
        });

        let mut result = self.result.read().await.clone();
        let images = self.images.read().await.clone();
        for image in images {
            match image {
                ScriptedImage::Remote {
                    url,
                    name,
                    thumbnail,
                    field,
                } => {
                    let id = capabilities.create_image(&url, &name, thumbnail).await?;
                    result.insert(field, id.as_str());
                }
                ScriptedImage::Local {
                    path,
                    name,
                    thumbnail,
                    field,
                } => {
                    let id = capabilities
                        .create_local_image(&path, &name, thumbnail)
                        .await?;
                    result.insert(field, id.as_str());
                }
            }
        }

        Ok(result)
    }
}

/// Recording implementation of the ImageDownloader trait.
///
/// Nothing is written to disk.
#[derive(Debug, Clone, Default)]
pub struct MockImageDownloader {
    downloads: Arc<RwLock<Vec<(String, PathBuf)>>>,
    next_failure: Arc<RwLock<Option<String>>>,
}

impl MockImageDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(url, destination)` downloaded so far.
    pub async fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.read().await.clone()
    }

    /// Make the next download fail with `message`.
    pub async fn fail_next(&self, message: &str) {
        *self.next_failure.write().await = Some(message.to_string());
    }
}

#[async_trait]
impl ImageDownloader for MockImageDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), PluginError> {
        if let Some(message) = self.next_failure.write().await.take() {
            return Err(PluginError::Download(message));
        }
        self.downloads
            .write()
            .await
            .push((url.to_string(), dest.to_path_buf()));
        Ok(())
    }
}
