//! Display views shared by the waitstaff and kitchen boards.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::warn;

use comanda_core::{dish_name, DiningTable, MenuItem, Order, OrderFilter};

use super::orders::OrderResponse;
use crate::state::AppState;

/// An order with the fields a screen needs to show it.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: OrderResponse,
    /// Menu name for the dish, or the code when the menu does not know it.
    pub dish_name: String,
    /// Creation time as `dd/mm HH:MM` in server local time.
    pub created_display: String,
}

impl OrderView {
    pub fn new(order: Order, menu: &[MenuItem]) -> Self {
        let dish_name = dish_name(&order.dish, menu).to_string();
        let created_display = format_created(order.created_at);
        Self {
            order: OrderResponse::from(order),
            dish_name,
            created_display,
        }
    }
}

pub fn format_created(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m %H:%M").to_string()
}

/// Fetch the menu, recording a notice instead of failing.
pub(crate) async fn load_menu(state: &AppState, notices: &mut Vec<String>) -> Vec<MenuItem> {
    match state.menu().menu().await {
        Ok(items) => items,
        Err(e) => {
            warn!("Menu lookup failed: {}", e);
            notices.push(format!("Could not load menu: {}", e));
            Vec::new()
        }
    }
}

/// Fetch available tables, recording a notice instead of failing.
pub(crate) async fn load_tables(state: &AppState, notices: &mut Vec<String>) -> Vec<DiningTable> {
    match state.tables().available_tables().await {
        Ok(tables) => tables,
        Err(e) => {
            warn!("Table lookup failed: {}", e);
            notices.push(format!("Could not load tables: {}", e));
            Vec::new()
        }
    }
}

/// List orders, recording a notice instead of failing.
pub(crate) fn load_orders(
    state: &AppState,
    filter: &OrderFilter,
    notices: &mut Vec<String>,
) -> Vec<Order> {
    match state.order_store().list(filter) {
        Ok(orders) => orders,
        Err(e) => {
            warn!("Order listing failed: {}", e);
            notices.push(format!("Could not load orders: {}", e));
            Vec::new()
        }
    }
}
