//! HTTP clients for the external menu and table services.
//!
//! Both services answer a plain GET with JSON, either a bare array or a
//! paginated `{"results": [...]}` page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{DiningTable, Listing, LookupError, MenuItem, MenuLookup, TableAvailability};

fn build_client(timeout_secs: u32) -> Result<Client, LookupError> {
    let client = Client::builder()
        .user_agent(concat!("comanda/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(u64::from(timeout_secs)))
        .build()?;
    Ok(client)
}

async fn fetch_listing<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<Vec<T>, LookupError> {
    debug!("Fetching reference data from {}", url);

    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Reference service {} returned {}", url, status);
        return Err(LookupError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    let listing: Listing<T> = response
        .json()
        .await
        .map_err(|e| LookupError::ParseError(format!("Failed to parse listing: {}", e)))?;

    Ok(listing.into_items())
}

/// Menu fetched from an external menu service.
pub struct HttpMenuClient {
    client: Client,
    url: String,
}

impl HttpMenuClient {
    pub fn new(url: impl Into<String>, timeout_secs: u32) -> Result<Self, LookupError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MenuLookup for HttpMenuClient {
    async fn menu(&self) -> Result<Vec<MenuItem>, LookupError> {
        fetch_listing(&self.client, &self.url).await
    }
}

/// Table availability fetched from an external table service.
///
/// The service lists every table; only those whose status marks them as
/// available are returned.
pub struct HttpTableClient {
    client: Client,
    url: String,
}

impl HttpTableClient {
    pub fn new(url: impl Into<String>, timeout_secs: u32) -> Result<Self, LookupError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TableAvailability for HttpTableClient {
    async fn available_tables(&self) -> Result<Vec<DiningTable>, LookupError> {
        let tables: Vec<DiningTable> = fetch_listing(&self.client, &self.url).await?;
        Ok(tables.into_iter().filter(|t| t.is_available()).collect())
    }
}
