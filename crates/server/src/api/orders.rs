//! Order API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use comanda_core::order::UnknownOrderState;
use comanda_core::{
    CreateOrderRequest, Order, OrderError, OrderFilter, OrderScope, OrderState, Transition,
};

use crate::metrics::{record_rejection, ORDERS_CREATED_TOTAL, ORDER_TRANSITIONS_TOTAL};
use crate::state::AppState;

/// Maximum allowed limit for order queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for order queries
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    /// Validated by the handler so out-of-range values get a JSON 400.
    pub table: Option<serde_json::Value>,
    pub customer: Option<String>,
    pub dish: Option<String>,
}

/// Query parameters for listing orders
#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    /// "all" (default) or "active"
    pub scope: Option<String>,
    /// Filter by exact state
    pub state: Option<String>,
    /// Filter by table
    pub table: Option<u32>,
    /// Maximum number of orders to return
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

/// Response for order operations
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub table: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    pub dish: String,
    pub state: OrderState,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            table: order.table.get(),
            customer: order.customer,
            dish: order.dish,
            state: order.state,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            delivered_at: order.delivered_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Response for listing orders
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map an engine error to its HTTP response.
pub(crate) fn order_error_response(err: OrderError) -> ApiError {
    record_rejection(&err);
    let status = match &err {
        OrderError::NotFound(_) => StatusCode::NOT_FOUND,
        OrderError::InvalidTransition { .. } | OrderError::DuplicateActiveOrder { .. } => {
            StatusCode::CONFLICT
        }
        OrderError::Database(msg) => {
            error!("Order store failure: {}", msg);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Apply a transition and publish the resulting state.
pub(crate) fn apply_transition(
    state: &AppState,
    id: &str,
    transition: Transition,
) -> Result<Order, ApiError> {
    let order = state
        .order_store()
        .transition(id, transition)
        .map_err(order_error_response)?;

    info!(
        "Order {} (table {}) {} -> {}",
        order.id,
        order.table,
        transition.operation(),
        order.state
    );
    ORDER_TRANSITIONS_TOTAL
        .with_label_values(&[transition.operation()])
        .inc();
    state.broadcaster().order_updated(&order);

    Ok(order)
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new order
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let table = match body.table {
        None | Some(serde_json::Value::Null) => return Err(bad_request("table is required")),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| bad_request("table must be a positive number"))?,
    };
    let dish = body
        .dish
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| bad_request("dish is required"))?;

    let mut request = CreateOrderRequest::new(table, dish);
    if let Some(customer) = body.customer.as_deref().map(str::trim) {
        if !customer.is_empty() {
            request = request.with_customer(customer);
        }
    }

    let order = state
        .order_store()
        .create(request)
        .map_err(order_error_response)?;

    info!("Order {} created for table {}", order.id, order.table);
    ORDERS_CREATED_TOTAL.inc();
    state.broadcaster().order_created(&order);

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// Get an order by ID
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    match state.order_store().get(&id) {
        Ok(Some(order)) => Ok(Json(OrderResponse::from(order))),
        Ok(None) => Err(order_error_response(OrderError::NotFound(id))),
        Err(e) => Err(order_error_response(e)),
    }
}

/// List orders, newest first
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let scope = match params.scope.as_deref() {
        None | Some("all") => OrderScope::AllStates,
        Some("active") => OrderScope::ActiveOnly,
        Some(other) => {
            return Err(bad_request(format!(
                "Invalid scope '{}': expected 'all' or 'active'",
                other
            )))
        }
    };

    let mut filter = OrderFilter::new()
        .with_scope(scope)
        .with_limit(limit)
        .with_offset(offset);

    if let Some(ref state_filter) = params.state {
        let order_state: OrderState = state_filter
            .parse()
            .map_err(|e: UnknownOrderState| bad_request(e.to_string()))?;
        filter = filter.with_state(order_state);
    }

    if let Some(table) = params.table {
        filter = filter.with_table(table);
    }

    let orders = state
        .order_store()
        .list(&filter)
        .map_err(order_error_response)?;
    let total = state
        .order_store()
        .count(&filter)
        .map_err(order_error_response)?;

    Ok(Json(ListOrdersResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

async fn transition_order(
    state: Arc<AppState>,
    id: String,
    transition: Transition,
) -> Result<Json<OrderResponse>, ApiError> {
    apply_transition(&state, &id, transition).map(|order| Json(OrderResponse::from(order)))
}

/// CREATED -> IN_PREPARATION
pub async fn confirm_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    transition_order(state, id, Transition::Confirm).await
}

/// IN_PREPARATION -> READY
pub async fn ready_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    transition_order(state, id, Transition::MarkReady).await
}

/// READY -> DELIVERED
pub async fn deliver_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    transition_order(state, id, Transition::Deliver).await
}

/// DELIVERED -> CLOSED
pub async fn close_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    transition_order(state, id, Transition::Close).await
}

/// Any active state -> CANCELLED
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    transition_order(state, id, Transition::Cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let (status, _) = order_error_response(OrderError::NotFound("x".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = order_error_response(OrderError::DuplicateActiveOrder {
            table: 3.into(),
        });
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.error.contains("Table 3"));

        let (status, _) = order_error_response(OrderError::InvalidTransition {
            order_id: "x".into(),
            operation: "deliver",
            required: "READY".into(),
            current: OrderState::Created,
        });
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = order_error_response(OrderError::Database("disk".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
