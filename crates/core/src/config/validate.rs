use std::collections::HashSet;

use super::{types::Config, ConfigError, LookupSource};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - HTTP lookups have an http(s) URL and a non-zero timeout
/// - Static menu codes are non-empty and unique
/// - Static table numbers are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    validate_lookup("menu", config.menu.source, config.menu.url.as_deref(), config.menu.timeout_secs)?;
    validate_lookup(
        "tables",
        config.tables.source,
        config.tables.url.as_deref(),
        config.tables.timeout_secs,
    )?;

    if config.menu.source == LookupSource::Static {
        let mut seen = HashSet::new();
        for item in &config.menu.items {
            if item.code.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "menu.items: code cannot be empty".to_string(),
                ));
            }
            if !seen.insert(item.code.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "menu.items: duplicate code {}",
                    item.code
                )));
            }
        }
    }

    if config.tables.source == LookupSource::Static && config.tables.numbers.contains(&0) {
        return Err(ConfigError::ValidationError(
            "tables.numbers: table 0 is not a valid table".to_string(),
        ));
    }

    Ok(())
}

fn validate_lookup(
    section: &str,
    source: LookupSource,
    url: Option<&str>,
    timeout_secs: u32,
) -> Result<(), ConfigError> {
    if source != LookupSource::Http {
        return Ok(());
    }

    match url {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
        Some(url) => {
            return Err(ConfigError::ValidationError(format!(
                "{}.url must be an http(s) URL, got {:?}",
                section, url
            )))
        }
        None => {
            return Err(ConfigError::ValidationError(format!(
                "{}.url must be set when {}.source = \"http\"",
                section, section
            )))
        }
    }

    if timeout_secs == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{}.timeout_secs cannot be 0",
            section
        )));
    }

    Ok(())
}
