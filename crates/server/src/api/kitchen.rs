//! Kitchen board and kitchen actions.
//!
//! Kitchen actions map onto engine transitions: starting an order confirms
//! it, running out of ingredients cancels it, and finishing it marks it ready
//! and then announces it to the floor.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use comanda_core::{OrderFilter, Transition};

use super::orders::{apply_transition, ApiError, OrderResponse};
use super::views::{load_menu, load_orders, OrderView};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct KitchenBoard {
    /// Active orders, newest first.
    pub orders: Vec<OrderView>,
    pub notices: Vec<String>,
}

/// Body of the order-ready webhook.
#[derive(Debug, Deserialize)]
pub struct OrderReadyWebhook {
    #[serde(alias = "pedido_id")]
    pub order_id: String,
}

pub async fn get_board(State(state): State<Arc<AppState>>) -> Json<KitchenBoard> {
    let mut notices = Vec::new();

    let menu = load_menu(&state, &mut notices).await;
    let orders = load_orders(&state, &OrderFilter::active(), &mut notices)
        .into_iter()
        .map(|order| OrderView::new(order, &menu))
        .collect();

    Json(KitchenBoard { orders, notices })
}

/// Kitchen starts preparing the order.
pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = apply_transition(&state, &id, Transition::Confirm)?;
    Ok(Json(OrderResponse::from(order)))
}

/// Kitchen cannot make the order.
pub async fn out_of_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = apply_transition(&state, &id, Transition::Cancel)?;
    Ok(Json(OrderResponse::from(order)))
}

/// Kitchen finished the order.
pub async fn ready(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    mark_ready_and_announce(&state, &id)
}

/// Same as [`ready`], for kitchen systems that post the order id.
pub async fn order_ready_webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OrderReadyWebhook>,
) -> Result<Json<OrderResponse>, ApiError> {
    mark_ready_and_announce(&state, body.order_id.trim())
}

fn mark_ready_and_announce(state: &AppState, id: &str) -> Result<Json<OrderResponse>, ApiError> {
    let order = apply_transition(state, id, Transition::MarkReady)?;
    // Announced only once the state change is stored
    state.broadcaster().order_ready(&order);
    Ok(Json(OrderResponse::from(order)))
}
