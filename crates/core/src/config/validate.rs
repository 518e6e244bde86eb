use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Database path is not empty
/// - Library path is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.database.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.path cannot be empty".to_string(),
        ));
    }

    if config.library.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "library.path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
