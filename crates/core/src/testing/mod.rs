//! Testing utilities and mock implementations of the reference lookups.
//!
//! The order store needs no mock: `SqliteOrderStore::in_memory()` is fast
//! and exercises the real transition rules.
//!
//! # Example
//!
//! ```rust,ignore
//! use comanda_core::testing::{fixtures, MockMenuLookup, MockTableAvailability};
//!
//! let menu = MockMenuLookup::with_items(fixtures::demo_menu());
//! let tables = MockTableAvailability::with_available(&[1, 2, 3]);
//! tables.occupy(2).await;
//!
//! // Use in AppState...
//! ```

mod mock_menu;
mod mock_tables;

pub use mock_menu::MockMenuLookup;
pub use mock_tables::MockTableAvailability;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::order::CreateOrderRequest;
    use crate::reference::{DiningTable, MenuItem};

    pub use crate::reference::demo_menu;

    /// Create a menu item without ingredients.
    pub fn menu_item(code: &str, name: &str) -> MenuItem {
        MenuItem::new(code, name)
    }

    /// Create a dining table with the given status.
    pub fn dining_table(number: u32, status: &str) -> DiningTable {
        DiningTable {
            number,
            seats: Some(4),
            status: status.to_string(),
        }
    }

    /// Create an order request for a table.
    pub fn order_request(table: u32, dish: &str) -> CreateOrderRequest {
        CreateOrderRequest::new(table, dish)
    }
}
