//! Order lifecycle engine.
//!
//! Owns the order entity, its state machine and the one-active-order-per-table
//! invariant. Collaborators only go through [`OrderStore`].

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteOrderStore;
pub use store::{CreateOrderRequest, OrderError, OrderFilter, OrderScope, OrderStore};
pub use types::{Order, OrderState, TableNumber, Transition, UnknownOrderState};
