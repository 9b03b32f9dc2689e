use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::reference::{demo_inventory, demo_menu, Inventory, MenuItem};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    /// Ingredient stock shown to the kitchen.
    #[serde(default = "demo_inventory")]
    pub inventory: Inventory,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            menu: MenuConfig::default(),
            tables: TablesConfig::default(),
            inventory: demo_inventory(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
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
    PathBuf::from("comanda.db")
}

/// Where reference data comes from.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    /// Served from this configuration file.
    #[default]
    Static,
    /// Fetched from an external HTTP service.
    Http,
}

impl LookupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupSource::Static => "static",
            LookupSource::Http => "http",
        }
    }
}

/// Menu lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuConfig {
    #[serde(default)]
    pub source: LookupSource,
    /// Menu service URL (required when source = "http")
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u32,
    /// Menu items served when source = "static"
    #[serde(default = "demo_menu")]
    pub items: Vec<MenuItem>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            source: LookupSource::Static,
            url: None,
            timeout_secs: default_lookup_timeout(),
            items: demo_menu(),
        }
    }
}

/// Table availability lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TablesConfig {
    #[serde(default)]
    pub source: LookupSource,
    /// Table service URL (required when source = "http")
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u32,
    /// Tables reported as available when source = "static"
    #[serde(default = "default_table_numbers")]
    pub numbers: Vec<u32>,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            source: LookupSource::Static,
            url: None,
            timeout_secs: default_lookup_timeout(),
            numbers: default_table_numbers(),
        }
    }
}

fn default_lookup_timeout() -> u32 {
    10
}

fn default_table_numbers() -> Vec<u32> {
    (1..=10).collect()
}

/// Sanitized config for API responses (URLs hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub menu: SanitizedLookupConfig,
    pub tables: SanitizedLookupConfig,
    pub inventory_items: usize,
}

/// Lookup config with the service URL replaced by a flag
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLookupConfig {
    pub source: String,
    pub url_configured: bool,
    pub timeout_secs: u32,
    /// Static entries (menu items or table numbers)
    pub static_entries: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            menu: SanitizedLookupConfig {
                source: config.menu.source.as_str().to_string(),
                url_configured: config.menu.url.as_deref().is_some_and(|u| !u.is_empty()),
                timeout_secs: config.menu.timeout_secs,
                static_entries: config.menu.items.len(),
            },
            tables: SanitizedLookupConfig {
                source: config.tables.source.as_str().to_string(),
                url_configured: config.tables.url.as_deref().is_some_and(|u| !u.is_empty()),
                timeout_secs: config.tables.timeout_secs,
                static_entries: config.tables.numbers.len(),
            },
            inventory_items: config.inventory.len(),
        }
    }
}
