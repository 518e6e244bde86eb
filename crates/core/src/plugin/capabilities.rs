//! Library-backed implementation of the plugin image capabilities.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tracing::info;

use super::{ImageCapabilities, PluginError};
use crate::config::LibraryConfig;
use crate::metrics;
use crate::store::{EntityStore, Image, SearchIndexer};

/// Fetches a remote image to a local file.
#[async_trait]
pub trait ImageDownloader: Send + Sync {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), PluginError>;
}

/// [`ImageDownloader`] over HTTP(S).
pub struct HttpImageDownloader {
    client: reqwest::Client,
}

impl HttpImageDownloader {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpImageDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageDownloader for HttpImageDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), PluginError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PluginError::Download(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        let bytes = response.bytes().await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}

/// Extension (with the leading dot) of the last path segment of `url`.
///
/// The path is taken after URL normalization, so dot segments and
/// backslashes are resolved the way the download request will see them.
/// Returns an empty string when `url` does not parse or the last segment
/// has no extension.
pub fn extension_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| Path::new(segment).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Image capabilities that persist into the library store.
///
/// Thumbnails get `" (thumbnail)"` appended to their name and are kept out
/// of the search index.
pub struct LibraryImageCapabilities {
    store: Arc<dyn EntityStore>,
    indexer: Arc<dyn SearchIndexer>,
    downloader: Arc<dyn ImageDownloader>,
    library: LibraryConfig,
}

impl LibraryImageCapabilities {
    pub fn new(
        store: Arc<dyn EntityStore>,
        indexer: Arc<dyn SearchIndexer>,
        downloader: Arc<dyn ImageDownloader>,
        library: LibraryConfig,
    ) -> Self {
        Self {
            store,
            indexer,
            downloader,
            library,
        }
    }

    fn new_image(name: &str, thumbnail: bool) -> Image {
        let mut image = Image::new(name);
        if thumbnail {
            image.name.push_str(" (thumbnail)");
        }
        image
    }

    async fn persist(&self, image: &Image, thumbnail: bool) -> Result<(), PluginError> {
        self.store.upsert_image(image).await?;
        if !thumbnail {
            self.indexer.index_images(std::slice::from_ref(image)).await?;
        }
        info!("Created image {}", image.id);
        Ok(())
    }
}

#[async_trait]
impl ImageCapabilities for LibraryImageCapabilities {
    async fn create_image(
        &self,
        url: &str,
        name: &str,
        thumbnail: bool,
    ) -> Result<String, PluginError> {
        info!("Creating image from {}", url);
        let mut image = Self::new_image(name, thumbnail);

        let relative = format!("images/{}{}", image.id, extension_from_url(url));
        let path = self.library.library_path(&relative);
        self.downloader.download(url, &path).await?;
        image.path = Some(path.to_string_lossy().into_owned());

        self.persist(&image, thumbnail).await?;
        metrics::IMAGES_CREATED.with_label_values(&["remote"]).inc();
        Ok(image.id)
    }

    async fn create_local_image(
        &self,
        path: &str,
        name: &str,
        thumbnail: bool,
    ) -> Result<String, PluginError> {
        info!("Creating image from {}", path);
        let mut image = Self::new_image(name, thumbnail);
        image.path = Some(path.to_string());

        self.persist(&image, thumbnail).await?;
        metrics::IMAGES_CREATED.with_label_values(&["local"]).inc();
        Ok(image.id)
    }
}
