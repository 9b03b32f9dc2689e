use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use comanda_core::{Inventory, MenuItem, SanitizedConfig};

use super::orders::ErrorResponse;
use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Prometheus scrape endpoint.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}

/// Ingredient stock.
pub async fn get_stock(State(state): State<Arc<AppState>>) -> Json<Inventory> {
    Json(state.inventory().clone())
}

#[derive(Serialize)]
pub struct MenuResponse {
    pub items: Vec<MenuItem>,
}

pub async fn get_menu(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MenuResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.menu().menu().await {
        Ok(items) => Ok(Json(MenuResponse { items })),
        Err(e) => {
            warn!("Menu lookup failed: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Could not load menu: {}", e),
                }),
            ))
        }
    }
}
