//! Order lifecycle integration tests.
//!
//! These tests drive the SQLite store through complete order lifecycles:
//! CREATED -> IN_PREPARATION -> READY -> DELIVERED -> CLOSED

use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use comanda_core::{
    testing::fixtures, CreateOrderRequest, OrderError, OrderFilter, OrderState, OrderStore,
    SqliteOrderStore, Transition,
};

/// Test helper owning a file-backed store.
struct TestHarness {
    store: Arc<SqliteOrderStore>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("orders.db");
        let store = Arc::new(SqliteOrderStore::new(&db_path).expect("Failed to create store"));
        Self {
            store,
            _temp_dir: temp_dir,
        }
    }

    fn active_on_table(&self, table: u32) -> usize {
        self.store
            .list(&OrderFilter::active().with_table(table))
            .unwrap()
            .len()
    }
}

#[test]
fn test_full_lifecycle() {
    let harness = TestHarness::new();
    let store = &harness.store;

    let order = store
        .create(CreateOrderRequest::new(5, "HOTDOG").with_customer("Ana"))
        .unwrap();
    assert_eq!(order.state, OrderState::Created);
    assert_eq!(order.customer.as_deref(), Some("Ana"));
    assert!(order.delivered_at.is_none());

    let confirmed = store.confirm(&order.id).unwrap();
    assert_eq!(confirmed.state, OrderState::InPreparation);

    let ready = store.mark_ready(&order.id).unwrap();
    assert_eq!(ready.state, OrderState::Ready);
    assert!(ready.delivered_at.is_none());

    let delivered = store.deliver(&order.id).unwrap();
    assert_eq!(delivered.state, OrderState::Delivered);
    let delivered_at = delivered.delivered_at.expect("delivered_at set on deliver");

    let closed = store.close(&order.id).unwrap();
    assert_eq!(closed.state, OrderState::Closed);
    assert_eq!(closed.delivered_at, Some(delivered_at));

    // Persisted, not just returned
    let stored = store.get(&order.id).unwrap().unwrap();
    assert_eq!(stored.state, OrderState::Closed);
    assert_eq!(stored.delivered_at, Some(delivered_at));
    assert!(stored.updated_at >= stored.created_at);
}

#[test]
fn test_second_create_on_same_table_rejected() {
    let harness = TestHarness::new();
    let store = &harness.store;

    store.create(fixtures::order_request(5, "HOTDOG")).unwrap();
    let err = store.create(fixtures::order_request(5, "SALAD")).unwrap_err();

    match err {
        OrderError::DuplicateActiveOrder { table } => assert_eq!(table.get(), 5),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(store.count(&OrderFilter::new()).unwrap(), 1);
}

#[test]
fn test_table_stays_occupied_until_terminal() {
    let harness = TestHarness::new();
    let store = &harness.store;

    let order = store.create(fixtures::order_request(2, "SALAD")).unwrap();
    for transition in [Transition::Confirm, Transition::MarkReady, Transition::Deliver] {
        store.transition(&order.id, transition).unwrap();
        assert!(matches!(
            store.create(fixtures::order_request(2, "SALAD")),
            Err(OrderError::DuplicateActiveOrder { .. })
        ));
    }

    store.close(&order.id).unwrap();
    let next = store.create(fixtures::order_request(2, "SALAD")).unwrap();
    assert_eq!(next.state, OrderState::Created);
}

#[test]
fn test_deliver_before_ready_names_required_state() {
    let harness = TestHarness::new();
    let store = &harness.store;

    let order = store.create(fixtures::order_request(3, "HOTDOG")).unwrap();
    let err = store.deliver(&order.id).unwrap_err();

    match &err {
        OrderError::InvalidTransition {
            required, current, ..
        } => {
            assert_eq!(required, "READY");
            assert_eq!(*current, OrderState::Created);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("READY"));
    assert!(message.contains("deliver"));

    let stored = store.get(&order.id).unwrap().unwrap();
    assert_eq!(stored, order);
}

#[test]
fn test_cancel_frees_table() {
    let harness = TestHarness::new();
    let store = &harness.store;

    let order = store.create(fixtures::order_request(4, "HOTDOG")).unwrap();
    store.cancel(&order.id).unwrap();

    assert!(matches!(
        store.confirm(&order.id),
        Err(OrderError::InvalidTransition { .. })
    ));

    let replacement = store.create(fixtures::order_request(4, "SALAD")).unwrap();
    assert_ne!(replacement.id, order.id);
    assert_eq!(harness.active_on_table(4), 1);
}

#[test]
fn test_terminal_states_reject_everything() {
    let harness = TestHarness::new();
    let store = &harness.store;

    let cancelled = store.create(fixtures::order_request(1, "HOTDOG")).unwrap();
    store.cancel(&cancelled.id).unwrap();

    let closed = store.create(fixtures::order_request(1, "HOTDOG")).unwrap();
    for transition in [
        Transition::Confirm,
        Transition::MarkReady,
        Transition::Deliver,
        Transition::Close,
    ] {
        store.transition(&closed.id, transition).unwrap();
    }

    for id in [&cancelled.id, &closed.id] {
        let before = store.get(id).unwrap().unwrap();
        for transition in Transition::ALL {
            let result = store.transition(id, transition);
            assert!(
                matches!(result, Err(OrderError::InvalidTransition { .. })),
                "{} on {} should fail",
                transition,
                before.state
            );
        }
        assert_eq!(store.get(id).unwrap().unwrap(), before);
    }
}

#[test]
fn test_unknown_order_not_found() {
    let harness = TestHarness::new();
    for transition in Transition::ALL {
        assert!(matches!(
            harness.store.transition("missing", transition),
            Err(OrderError::NotFound(_))
        ));
    }
}

#[test]
fn test_listing_scopes() {
    let harness = TestHarness::new();
    let store = &harness.store;

    let first = store.create(fixtures::order_request(1, "HOTDOG")).unwrap();
    let second = store.create(fixtures::order_request(2, "SALAD")).unwrap();
    let third = store.create(fixtures::order_request(3, "BEEF_BURGER")).unwrap();
    store.cancel(&second.id).unwrap();

    let all: Vec<String> = store
        .list(&OrderFilter::new())
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(all, vec![third.id.clone(), second.id.clone(), first.id.clone()]);

    let active: Vec<String> = store
        .list(&OrderFilter::active())
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(active, vec![third.id, first.id]);
    assert_eq!(store.count(&OrderFilter::active()).unwrap(), 2);
}

/// Walk every order through a fixed mix of legal and illegal operations and
/// check the table invariant after each step.
#[test]
fn test_invariants_hold_across_operation_mix() {
    let harness = TestHarness::new();
    let store = &harness.store;
    let script: [(u32, Option<Transition>); 14] = [
        (1, None),
        (1, Some(Transition::Deliver)),
        (1, Some(Transition::Confirm)),
        (2, None),
        (1, None),
        (2, Some(Transition::Cancel)),
        (2, None),
        (1, Some(Transition::MarkReady)),
        (1, Some(Transition::Close)),
        (1, Some(Transition::Deliver)),
        (1, None),
        (1, Some(Transition::Close)),
        (1, None),
        (2, Some(Transition::Confirm)),
    ];

    for (table, step) in script {
        match step {
            None => {
                let _ = store.create(fixtures::order_request(table, "HOTDOG"));
            }
            Some(transition) => {
                let target = store
                    .list(&OrderFilter::active().with_table(table))
                    .unwrap()
                    .into_iter()
                    .next();
                if let Some(order) = target {
                    let before = order.clone();
                    match store.transition(&order.id, transition) {
                        Ok(after) => {
                            assert!(transition.is_allowed_from(before.state));
                            assert_eq!(after.state, transition.target_state());
                            assert!(after.updated_at >= before.updated_at);
                            if before.delivered_at.is_some() {
                                assert_eq!(after.delivered_at, before.delivered_at);
                            }
                        }
                        Err(_) => {
                            assert!(!transition.is_allowed_from(before.state));
                            assert_eq!(store.get(&order.id).unwrap().unwrap(), before);
                        }
                    }
                }
            }
        }

        for t in [1, 2] {
            assert!(harness.active_on_table(t) <= 1, "table {} has two active orders", t);
        }
    }
}

#[test]
fn test_concurrent_creates_on_same_table() {
    let harness = TestHarness::new();
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|i| {
            let store = Arc::clone(&harness.store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.create(CreateOrderRequest::new(9, format!("DISH_{}", i)))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(OrderError::DuplicateActiveOrder { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(duplicates, workers - 1);
    assert_eq!(harness.active_on_table(9), 1);
}

#[test]
fn test_concurrent_confirms_apply_once() {
    let harness = TestHarness::new();
    let order = harness
        .store
        .create(fixtures::order_request(6, "HOTDOG"))
        .unwrap();
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let store = Arc::clone(&harness.store);
            let barrier = Arc::clone(&barrier);
            let id = order.id.clone();
            thread::spawn(move || {
                barrier.wait();
                store.confirm(&id)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, OrderError::InvalidTransition { .. })));

    let stored = harness.store.get(&order.id).unwrap().unwrap();
    assert_eq!(stored.state, OrderState::InPreparation);
}
