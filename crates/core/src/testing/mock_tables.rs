//! Mock table availability for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::reference::{DiningTable, LookupError, TableAvailability};

/// Mock implementation of the TableAvailability trait.
///
/// Holds every table with its status and reports only the available ones,
/// like the external table service does.
#[derive(Debug, Default)]
pub struct MockTableAvailability {
    tables: Arc<RwLock<Vec<DiningTable>>>,
    fetches: Arc<RwLock<usize>>,
    next_error: Arc<RwLock<Option<LookupError>>>,
}

impl MockTableAvailability {
    /// Create a mock with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with the given tables, all available.
    pub fn with_available(numbers: &[u32]) -> Self {
        Self {
            tables: Arc::new(RwLock::new(
                numbers.iter().map(|n| DiningTable::available(*n)).collect(),
            )),
            ..Self::default()
        }
    }

    /// Add or replace a table.
    pub async fn set_table(&self, table: DiningTable) {
        let mut tables = self.tables.write().await;
        tables.retain(|t| t.number != table.number);
        tables.push(table);
        tables.sort_by_key(|t| t.number);
    }

    /// Mark a table as occupied.
    pub async fn occupy(&self, number: u32) {
        let mut table = DiningTable::available(number);
        table.status = "occupied".to_string();
        self.set_table(table).await;
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
impl TableAvailability for MockTableAvailability {
    async fn available_tables(&self) -> Result<Vec<DiningTable>, LookupError> {
        *self.fetches.write().await += 1;

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self
            .tables
            .read()
            .await
            .iter()
            .filter(|t| t.is_available())
            .cloned()
            .collect())
    }
}
