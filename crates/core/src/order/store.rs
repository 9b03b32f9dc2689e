//! Order storage trait and types.

use thiserror::Error;

use crate::order::{Order, OrderState, TableNumber, Transition};

/// Error type for order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order exists for the identifier.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order's current state does not allow the operation.
    #[error("Cannot {operation} order {order_id}: requires {required}, current state is {current}")]
    InvalidTransition {
        order_id: String,
        operation: &'static str,
        required: String,
        current: OrderState,
    },

    /// The table already has a non-terminal order.
    #[error("Table {table} already has an active order")]
    DuplicateActiveOrder { table: TableNumber },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Request to create a new order.
///
/// Field formats are validated by the caller.
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub table: TableNumber,
    pub customer: Option<String>,
    pub dish: String,
}

impl CreateOrderRequest {
    pub fn new(table: impl Into<TableNumber>, dish: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            customer: None,
            dish: dish.into(),
        }
    }

    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }
}

/// Which orders a listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order, terminal ones included.
    #[default]
    AllStates,
    /// Only orders still occupying a table.
    ActiveOnly,
}

/// Filter for querying orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub scope: OrderScope,
    /// Filter by exact state.
    pub state: Option<OrderState>,
    /// Filter by table.
    pub table: Option<TableNumber>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl OrderFilter {
    /// Create a new filter covering every state.
    pub fn new() -> Self {
        Self {
            scope: OrderScope::AllStates,
            state: None,
            table: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Filter covering only active orders.
    pub fn active() -> Self {
        Self::new().with_scope(OrderScope::ActiveOnly)
    }

    pub fn with_scope(mut self, scope: OrderScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_state(mut self, state: OrderState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_table(mut self, table: impl Into<TableNumber>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// States this filter admits.
    pub fn states(&self) -> Vec<OrderState> {
        let scoped: &[OrderState] = match self.scope {
            OrderScope::AllStates => &OrderState::ALL,
            OrderScope::ActiveOnly => &OrderState::ACTIVE,
        };
        scoped
            .iter()
            .copied()
            .filter(|s| self.state.is_none_or(|wanted| wanted == *s))
            .collect()
    }
}

/// Trait for order storage backends.
///
/// Every method is atomic: a failed call leaves stored orders unchanged.
pub trait OrderStore: Send + Sync {
    /// Create a new order in CREATED state.
    ///
    /// Fails with [`OrderError::DuplicateActiveOrder`] if the table already has
    /// an active order. This is the only place table occupancy is checked.
    fn create(&self, request: CreateOrderRequest) -> Result<Order, OrderError>;

    /// Get an order by ID.
    fn get(&self, id: &str) -> Result<Option<Order>, OrderError>;

    /// List orders matching the filter, newest first.
    fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError>;

    /// Count orders matching the filter (ignores limit/offset).
    fn count(&self, filter: &OrderFilter) -> Result<i64, OrderError>;

    /// Apply a state transition to an order.
    fn transition(&self, id: &str, transition: Transition) -> Result<Order, OrderError>;

    /// CREATED -> IN_PREPARATION.
    fn confirm(&self, id: &str) -> Result<Order, OrderError> {
        self.transition(id, Transition::Confirm)
    }

    /// IN_PREPARATION -> READY.
    fn mark_ready(&self, id: &str) -> Result<Order, OrderError> {
        self.transition(id, Transition::MarkReady)
    }

    /// READY -> DELIVERED, stamping `delivered_at`.
    fn deliver(&self, id: &str) -> Result<Order, OrderError> {
        self.transition(id, Transition::Deliver)
    }

    /// DELIVERED -> CLOSED.
    fn close(&self, id: &str) -> Result<Order, OrderError> {
        self.transition(id, Transition::Close)
    }

    /// Any non-terminal state -> CANCELLED.
    fn cancel(&self, id: &str) -> Result<Order, OrderError> {
        self.transition(id, Transition::Cancel)
    }
}
