use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Output directory is not empty
/// - Metadata timeout is not 0
/// - Event channel capacity is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.output.directory.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "output.directory cannot be empty".to_string(),
        ));
    }

    if config.orchestrator.metadata_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.metadata_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.event_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.event_capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}
