//! Reference data lookups: the menu and dining table availability.
//!
//! Both are read-only views of data owned elsewhere. They are served either
//! from the configuration file or from an external HTTP service.

mod http;
mod static_data;
mod types;

pub use http::{HttpMenuClient, HttpTableClient};
pub use static_data::{StaticMenu, StaticTables};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{LookupSource, MenuConfig, TablesConfig};

/// Errors that can occur when fetching reference data.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Lookup not configured (missing URL, etc.).
    #[error("Lookup not configured: {0}")]
    NotConfigured(String),
}

/// Source of the dishes that can be ordered.
#[async_trait]
pub trait MenuLookup: Send + Sync {
    /// Fetch the current menu.
    async fn menu(&self) -> Result<Vec<MenuItem>, LookupError>;
}

/// Source of the tables that can currently take an order.
#[async_trait]
pub trait TableAvailability: Send + Sync {
    /// Fetch the tables currently available.
    async fn available_tables(&self) -> Result<Vec<DiningTable>, LookupError>;
}

/// Build the menu lookup selected by the configuration.
pub fn create_menu_lookup(config: &MenuConfig) -> Result<Box<dyn MenuLookup>, LookupError> {
    match config.source {
        LookupSource::Static => Ok(Box::new(StaticMenu::new(config.items.clone()))),
        LookupSource::Http => {
            let url = required_url("menu", config.url.as_deref())?;
            Ok(Box::new(HttpMenuClient::new(url, config.timeout_secs)?))
        }
    }
}

/// Build the table availability lookup selected by the configuration.
pub fn create_table_availability(
    config: &TablesConfig,
) -> Result<Box<dyn TableAvailability>, LookupError> {
    match config.source {
        LookupSource::Static => Ok(Box::new(StaticTables::new(config.numbers.clone()))),
        LookupSource::Http => {
            let url = required_url("tables", config.url.as_deref())?;
            Ok(Box::new(HttpTableClient::new(url, config.timeout_secs)?))
        }
    }
}

fn required_url<'a>(section: &str, url: Option<&'a str>) -> Result<&'a str, LookupError> {
    match url {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => Err(LookupError::NotConfigured(format!(
            "{}.url is required when source = \"http\"",
            section
        ))),
    }
}
