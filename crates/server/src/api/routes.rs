use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{handlers, kitchen, orders, waitstaff, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Reference data
        .route("/menu", get(handlers::get_menu))
        .route("/stock", get(handlers::get_stock))
        // Orders
        .route("/orders", post(orders::create_order))
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/confirm", post(orders::confirm_order))
        .route("/orders/{id}/ready", post(orders::ready_order))
        .route("/orders/{id}/deliver", post(orders::deliver_order))
        .route("/orders/{id}/close", post(orders::close_order))
        .route("/orders/{id}/cancel", post(orders::cancel_order))
        // Boards
        .route("/waitstaff", get(waitstaff::get_board))
        .route("/kitchen", get(kitchen::get_board))
        // Kitchen actions
        .route("/kitchen/orders/{id}/start", post(kitchen::start))
        .route("/kitchen/orders/{id}/out-of-stock", post(kitchen::out_of_stock))
        .route("/kitchen/orders/{id}/ready", post(kitchen::ready))
        .route(
            "/webhooks/kitchen/order-ready",
            post(kitchen::order_ready_webhook),
        )
        // Live updates
        .route("/ws", get(ws::ws_handler))
        .with_state(Arc::clone(&state));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
