pub mod handlers;
pub mod kitchen;
pub mod middleware;
pub mod orders;
pub mod routes;
pub mod views;
pub mod waitstaff;
pub mod ws;

pub use routes::create_router;
pub use ws::{OrderBroadcaster, OrderEvent};
