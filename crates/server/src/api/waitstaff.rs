//! Waitstaff board: what the floor needs to take and serve orders.

use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use comanda_core::{DiningTable, MenuItem, OrderFilter};

use super::views::{load_menu, load_orders, load_tables, OrderView};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WaitstaffBoard {
    pub menu: Vec<MenuItem>,
    /// Tables free according to the table service and with no active order.
    pub available_tables: Vec<DiningTable>,
    /// Every order, newest first.
    pub orders: Vec<OrderView>,
    /// Problems loading reference data or orders.
    pub notices: Vec<String>,
}

pub async fn get_board(State(state): State<Arc<AppState>>) -> Json<WaitstaffBoard> {
    let mut notices = Vec::new();

    let menu = load_menu(&state, &mut notices).await;
    let tables = load_tables(&state, &mut notices).await;
    let orders = load_orders(&state, &OrderFilter::new(), &mut notices);

    // Occupancy must see every active order, not just the displayed page
    let occupied: BTreeSet<u32> =
        load_orders(&state, &OrderFilter::active().with_limit(i64::MAX), &mut notices)
            .iter()
            .map(|o| o.table.get())
            .collect();
    let available_tables = tables
        .into_iter()
        .filter(|t| !occupied.contains(&t.number))
        .collect();

    let orders = orders
        .into_iter()
        .map(|order| OrderView::new(order, &menu))
        .collect();

    Json(WaitstaffBoard {
        menu,
        available_tables,
        orders,
        notices,
    })
}
