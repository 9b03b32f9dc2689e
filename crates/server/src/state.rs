use std::sync::Arc;

use comanda_core::{
    Config, Inventory, MenuLookup, OrderStore, SanitizedConfig, TableAvailability,
};

use crate::api::OrderBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    order_store: Arc<dyn OrderStore>,
    menu: Arc<dyn MenuLookup>,
    tables: Arc<dyn TableAvailability>,
    broadcaster: OrderBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        order_store: Arc<dyn OrderStore>,
        menu: Arc<dyn MenuLookup>,
        tables: Arc<dyn TableAvailability>,
        broadcaster: OrderBroadcaster,
    ) -> Self {
        Self {
            config,
            order_store,
            menu,
            tables,
            broadcaster,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn order_store(&self) -> &dyn OrderStore {
        self.order_store.as_ref()
    }

    pub fn menu(&self) -> &dyn MenuLookup {
        self.menu.as_ref()
    }

    pub fn tables(&self) -> &dyn TableAvailability {
        self.tables.as_ref()
    }

    pub fn broadcaster(&self) -> &OrderBroadcaster {
        &self.broadcaster
    }

    pub fn inventory(&self) -> &Inventory {
        &self.config.inventory
    }
}
