//! Core order data types and the order state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::OrderError;

/// Physical table identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TableNumber(pub u32);

impl TableNumber {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for TableNumber {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

impl fmt::Display for TableNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an unknown state name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown order state: {0}")]
pub struct UnknownOrderState(pub String);

/// Order state.
///
/// ```text
/// Created -> InPreparation -> Ready -> Delivered -> Closed
///
/// Any non-terminal state can transition to Cancelled.
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Taken by the waitstaff, not yet accepted by the kitchen.
    Created,
    /// Kitchen is preparing the dish.
    InPreparation,
    /// Dish is ready to be picked up.
    Ready,
    /// Dish was served at the table.
    Delivered,
    /// Order settled (terminal).
    Closed,
    /// Order abandoned (terminal).
    Cancelled,
}

impl OrderState {
    /// Every state, in lifecycle order.
    pub const ALL: [OrderState; 6] = [
        OrderState::Created,
        OrderState::InPreparation,
        OrderState::Ready,
        OrderState::Delivered,
        OrderState::Closed,
        OrderState::Cancelled,
    ];

    /// States that occupy a table.
    pub const ACTIVE: [OrderState; 4] = [
        OrderState::Created,
        OrderState::InPreparation,
        OrderState::Ready,
        OrderState::Delivered,
    ];

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Closed | OrderState::Cancelled)
    }

    /// Returns true if the order still occupies its table.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the order can be cancelled from this state.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Stable name used for storage, filtering and the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "CREATED",
            OrderState::InPreparation => "IN_PREPARATION",
            OrderState::Ready => "READY",
            OrderState::Delivered => "DELIVERED",
            OrderState::Closed => "CLOSED",
            OrderState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = UnknownOrderState;

    /// Case-insensitive, so query strings may use `ready` or `READY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        OrderState::ALL
            .into_iter()
            .find(|state| state.as_str() == upper)
            .ok_or_else(|| UnknownOrderState(s.to_string()))
    }
}

/// A state-changing operation on an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Confirm,
    MarkReady,
    Deliver,
    Close,
    Cancel,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Transition::Confirm,
        Transition::MarkReady,
        Transition::Deliver,
        Transition::Close,
        Transition::Cancel,
    ];

    /// Operation name, as used in error messages and metric labels.
    pub fn operation(&self) -> &'static str {
        match self {
            Transition::Confirm => "confirm",
            Transition::MarkReady => "mark_ready",
            Transition::Deliver => "deliver",
            Transition::Close => "close",
            Transition::Cancel => "cancel",
        }
    }

    /// The single source state this transition requires.
    ///
    /// `None` for cancel, which accepts any non-terminal state.
    pub fn required_state(&self) -> Option<OrderState> {
        match self {
            Transition::Confirm => Some(OrderState::Created),
            Transition::MarkReady => Some(OrderState::InPreparation),
            Transition::Deliver => Some(OrderState::Ready),
            Transition::Close => Some(OrderState::Delivered),
            Transition::Cancel => None,
        }
    }

    /// Human-readable precondition.
    pub fn required_description(&self) -> String {
        match self.required_state() {
            Some(state) => state.to_string(),
            None => "a non-terminal state".to_string(),
        }
    }

    pub fn target_state(&self) -> OrderState {
        match self {
            Transition::Confirm => OrderState::InPreparation,
            Transition::MarkReady => OrderState::Ready,
            Transition::Deliver => OrderState::Delivered,
            Transition::Close => OrderState::Closed,
            Transition::Cancel => OrderState::Cancelled,
        }
    }

    /// Returns true if this transition is legal from `current`.
    pub fn is_allowed_from(&self, current: OrderState) -> bool {
        match self.required_state() {
            Some(required) => current == required,
            None => current.can_cancel(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

/// A customer order tied to one table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique identifier (UUID).
    pub id: String,

    /// Table the order belongs to.
    pub table: TableNumber,

    /// Free-text customer label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,

    /// Menu item code.
    pub dish: String,

    /// Current state.
    pub state: OrderState,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,

    /// When the order first reached DELIVERED. Written once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Apply `transition` at time `now`.
    ///
    /// On failure the order is left untouched.
    pub fn apply(&mut self, transition: Transition, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !transition.is_allowed_from(self.state) {
            return Err(OrderError::InvalidTransition {
                order_id: self.id.clone(),
                operation: transition.operation(),
                required: transition.required_description(),
                current: self.state,
            });
        }

        let next = transition.target_state();
        if next == OrderState::Delivered && self.delivered_at.is_none() {
            self.delivered_at = Some(now);
        }
        self.state = next;
        // updated_at never moves backwards, even if the wall clock does.
        self.updated_at = self.updated_at.max(now);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn order_in(state: OrderState) -> Order {
        let now = Utc::now();
        Order {
            id: "order-1".to_string(),
            table: TableNumber(5),
            customer: Some("Ana".to_string()),
            dish: "HOTDOG".to_string(),
            state,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderState::Closed.is_terminal());
        assert!(OrderState::Cancelled.is_terminal());
        for state in OrderState::ACTIVE {
            assert!(!state.is_terminal(), "{} should be active", state);
            assert!(state.can_cancel());
        }
    }

    #[test]
    fn test_transition_allowed_only_from_required_state() {
        for transition in Transition::ALL {
            for state in OrderState::ALL {
                let expected = match transition {
                    Transition::Confirm => state == OrderState::Created,
                    Transition::MarkReady => state == OrderState::InPreparation,
                    Transition::Deliver => state == OrderState::Ready,
                    Transition::Close => state == OrderState::Delivered,
                    Transition::Cancel => !state.is_terminal(),
                };
                assert_eq!(
                    transition.is_allowed_from(state),
                    expected,
                    "{} from {}",
                    transition,
                    state
                );
            }
        }
    }

    #[test]
    fn test_apply_happy_path() {
        let mut order = order_in(OrderState::Created);
        let steps = [
            (Transition::Confirm, OrderState::InPreparation),
            (Transition::MarkReady, OrderState::Ready),
            (Transition::Deliver, OrderState::Delivered),
            (Transition::Close, OrderState::Closed),
        ];
        for (transition, expected) in steps {
            order.apply(transition, Utc::now()).unwrap();
            assert_eq!(order.state, expected);
        }
        assert!(order.delivered_at.is_some());
    }

    #[test]
    fn test_apply_invalid_leaves_order_unchanged() {
        let mut order = order_in(OrderState::Created);
        let before = order.clone();

        let err = order
            .apply(Transition::Deliver, Utc::now() + Duration::seconds(5))
            .unwrap_err();

        assert_eq!(order, before);
        match err {
            OrderError::InvalidTransition {
                operation,
                required,
                current,
                ..
            } => {
                assert_eq!(operation, "deliver");
                assert_eq!(required, "READY");
                assert_eq!(current, OrderState::Created);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_transition_message_names_operation_and_state() {
        let mut order = order_in(OrderState::Created);
        let err = order.apply(Transition::Deliver, Utc::now()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("deliver"));
        assert!(message.contains("READY"));
    }

    #[test]
    fn test_deliver_keeps_existing_delivered_at() {
        let earlier = Utc::now() - Duration::minutes(30);
        let mut order = order_in(OrderState::Ready);
        order.delivered_at = Some(earlier);

        order.apply(Transition::Deliver, Utc::now()).unwrap();

        assert_eq!(order.delivered_at, Some(earlier));
    }

    #[test]
    fn test_delivered_at_survives_close() {
        let mut order = order_in(OrderState::Ready);
        order.apply(Transition::Deliver, Utc::now()).unwrap();
        let delivered_at = order.delivered_at;

        order
            .apply(Transition::Close, Utc::now() + Duration::seconds(1))
            .unwrap();

        assert_eq!(order.delivered_at, delivered_at);
    }

    #[test]
    fn test_updated_at_never_decreases() {
        let mut order = order_in(OrderState::Created);
        let original = order.updated_at;

        order
            .apply(Transition::Confirm, original - Duration::seconds(10))
            .unwrap();

        assert_eq!(order.updated_at, original);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for state in [OrderState::Closed, OrderState::Cancelled] {
            for transition in Transition::ALL {
                let mut order = order_in(state);
                assert!(
                    matches!(
                        order.apply(transition, Utc::now()),
                        Err(OrderError::InvalidTransition { .. })
                    ),
                    "{} from {} should fail",
                    transition,
                    state
                );
            }
        }
    }

    #[test]
    fn test_state_parse_case_insensitive() {
        assert_eq!("READY".parse::<OrderState>().unwrap(), OrderState::Ready);
        assert_eq!(
            "in_preparation".parse::<OrderState>().unwrap(),
            OrderState::InPreparation
        );
        assert!("eaten".parse::<OrderState>().is_err());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&OrderState::InPreparation).unwrap();
        assert_eq!(json, r#""IN_PREPARATION""#);

        let deserialized: OrderState = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, OrderState::InPreparation);
    }

    #[test]
    fn test_order_serialization_skips_empty_optionals() {
        let mut order = order_in(OrderState::Created);
        order.customer = None;
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["table"], 5);
        assert_eq!(json["state"], "CREATED");
        assert!(json.get("customer").is_none());
        assert!(json.get("delivered_at").is_none());
    }
}
