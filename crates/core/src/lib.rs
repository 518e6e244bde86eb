pub mod config;
pub mod enrichment;
pub mod extractor;
pub mod metrics;
pub mod plugin;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    LibraryConfig, PluginsConfig,
};
pub use enrichment::{MergeError, MovieEnricher};
pub use extractor::{ExtractError, ExtractedEntities, Extractor};
pub use plugin::{
    HttpImageDownloader, ImageCapabilities, ImageDownloader, LibraryImageCapabilities,
    PluginError, PluginHost, PluginInput, PluginResult, PluginValue, MOVIE_CREATED_EVENT,
};
pub use store::{
    CatalogEntry, CatalogProvider, EntityKind, EntityStore, Image, Movie, SearchIndexer,
    SqliteLibrary, StoreError, Studio,
};
