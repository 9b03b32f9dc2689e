//! Mock menu lookup for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::reference::{LookupError, MenuItem, MenuLookup};

/// Mock implementation of the MenuLookup trait.
///
/// Serves a configurable menu, counts fetches and can be told to fail the
/// next fetch.
///
/// # Example
///
/// ```rust,ignore
/// use comanda_core::testing::{fixtures, MockMenuLookup};
///
/// let menu = MockMenuLookup::with_items(fixtures::demo_menu());
/// menu.set_next_error(LookupError::NotConfigured("down".into())).await;
/// assert!(menu.menu().await.is_err());
/// assert!(menu.menu().await.is_ok());
/// ```
#[derive(Debug, Default)]
pub struct MockMenuLookup {
    items: Arc<RwLock<Vec<MenuItem>>>,
    fetches: Arc<RwLock<usize>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<LookupError>>>,
}

impl MockMenuLookup {
    /// Create a mock with an empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock serving the given items.
    pub fn with_items(items: Vec<MenuItem>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            ..Self::default()
        }
    }

    /// Replace the served menu.
    pub async fn set_items(&self, items: Vec<MenuItem>) {
        *self.items.write().await = items;
    }

    /// Number of fetches performed, failed ones included.
    pub async fn fetch_count(&self) -> usize {
        *self.fetches.read().await
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: LookupError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }
}

#[async_trait]
impl MenuLookup for MockMenuLookup {
    async fn menu(&self) -> Result<Vec<MenuItem>, LookupError> {
        *self.fetches.write().await += 1;

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self.items.read().await.clone())
    }
}
