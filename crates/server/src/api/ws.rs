//! WebSocket feed of order events for the waitstaff and kitchen screens.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use comanda_core::{Order, OrderState};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between heartbeats on each socket.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Event pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    /// A new order was taken.
    OrderCreated {
        order_id: String,
        table: u32,
        dish: String,
    },
    /// An order changed state.
    OrderUpdated {
        order_id: String,
        table: u32,
        state: OrderState,
    },
    /// The kitchen finished an order and it can be served.
    OrderReady {
        order_id: String,
        table: u32,
        dish: String,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl OrderEvent {
    fn kind(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated { .. } => "order_created",
            OrderEvent::OrderUpdated { .. } => "order_updated",
            OrderEvent::OrderReady { .. } => "order_ready",
            OrderEvent::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// Broadcaster for order events using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct OrderBroadcaster {
    sender: broadcast::Sender<OrderEvent>,
}

impl OrderBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast an event to all connected clients.
    pub fn broadcast(&self, event: OrderEvent) {
        // No receivers just means no screen is connected
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.sender.subscribe()
    }

    pub fn order_created(&self, order: &Order) {
        self.broadcast(OrderEvent::OrderCreated {
            order_id: order.id.clone(),
            table: order.table.get(),
            dish: order.dish.clone(),
        });
    }

    pub fn order_updated(&self, order: &Order) {
        self.broadcast(OrderEvent::OrderUpdated {
            order_id: order.id.clone(),
            table: order.table.get(),
            state: order.state,
        });
    }

    pub fn order_ready(&self, order: &Order) {
        self.broadcast(OrderEvent::OrderReady {
            order_id: order.id.clone(),
            table: order.table.get(),
            dish: order.dish.clone(),
        });
    }
}

impl Default for OrderBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        // First tick completes immediately
        heartbeat.tick().await;

        loop {
            let event = tokio::select! {
                result = rx.recv() => match result {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged, skipped {} events", n);
                        WS_LAG_EVENTS.inc();
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                },
                _ = heartbeat.tick() => OrderEvent::Heartbeat {
                    timestamp: Utc::now().timestamp(),
                },
            };

            WS_MESSAGES_SENT.with_label_values(&[event.kind()]).inc();

            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize OrderEvent: {}", e);
                }
            }
        }
    });

    // Clients only send close/ping; anything else is logged and ignored
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
