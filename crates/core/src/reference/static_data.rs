//! Reference data served from configuration.

use async_trait::async_trait;

use super::{DiningTable, LookupError, MenuItem, MenuLookup, TableAvailability};

/// Fixed menu.
pub struct StaticMenu {
    items: Vec<MenuItem>,
}

impl StaticMenu {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl MenuLookup for StaticMenu {
    async fn menu(&self) -> Result<Vec<MenuItem>, LookupError> {
        Ok(self.items.clone())
    }
}

/// Fixed set of tables, all reported as available.
pub struct StaticTables {
    numbers: Vec<u32>,
}

impl StaticTables {
    pub fn new(mut numbers: Vec<u32>) -> Self {
        numbers.sort_unstable();
        numbers.dedup();
        Self { numbers }
    }
}

#[async_trait]
impl TableAvailability for StaticTables {
    async fn available_tables(&self) -> Result<Vec<DiningTable>, LookupError> {
        Ok(self
            .numbers
            .iter()
            .map(|n| DiningTable::available(*n))
            .collect())
    }
}
