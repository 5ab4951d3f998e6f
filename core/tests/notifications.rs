//! Change-notification tests — synchronous ordered dispatch, payload
//! correctness, and subscriber isolation.

use std::cell::RefCell;
use std::rc::Rc;
use tradewinds_core::{
    config::GameConfig,
    observer::{ChangeEvent, ChangeKind},
    save::MemorySaveStore,
    store::GameStateStore,
};

fn test_store() -> GameStateStore {
    GameStateStore::new_game(
        GameConfig::default_test(),
        Box::new(MemorySaveStore::new()),
        42,
    )
}

#[test]
fn buy_fires_credits_and_cargo_with_new_values() {
    let mut store = test_store();
    let credits_seen = Rc::new(RefCell::new(Vec::new()));
    let cargo_seen = Rc::new(RefCell::new(Vec::new()));

    let credits_log = Rc::clone(&credits_seen);
    store.subscribe(
        ChangeKind::Credits,
        Box::new(move |event| {
            if let ChangeEvent::CreditsChanged(value) = event {
                credits_log.borrow_mut().push(*value);
            }
        }),
    );
    let cargo_log = Rc::clone(&cargo_seen);
    store.subscribe(
        ChangeKind::Cargo,
        Box::new(move |event| {
            if let ChangeEvent::CargoChanged(cargo) = event {
                cargo_log.borrow_mut().push(cargo.len());
            }
        }),
    );

    store.buy("grain", 20, 10).unwrap();
    assert_eq!(*credits_seen.borrow(), vec![300]);
    assert_eq!(*cargo_seen.borrow(), vec![1]);

    // Dispatch is synchronous: the payload above was already the
    // post-mutation value by the time buy() returned.
    store.sell(0, 20, 10).unwrap();
    assert_eq!(*credits_seen.borrow(), vec![300, 500]);
    assert_eq!(*cargo_seen.borrow(), vec![1, 0]);
}

#[test]
fn delivery_runs_in_registration_order() {
    let mut store = test_store();
    let order = Rc::new(RefCell::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let order = Rc::clone(&order);
        store.subscribe(
            ChangeKind::Time,
            Box::new(move |_| order.borrow_mut().push(tag)),
        );
    }

    store.advance_time(1).unwrap();
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn a_panicking_subscriber_never_blocks_the_rest() {
    let mut store = test_store();
    let delivered = Rc::new(RefCell::new(0));

    store.subscribe(
        ChangeKind::Credits,
        Box::new(|_| panic!("subscriber bug")),
    );
    let count = Rc::clone(&delivered);
    store.subscribe(
        ChangeKind::Credits,
        Box::new(move |_| *count.borrow_mut() += 1),
    );

    // The mutation itself also survives the bad subscriber.
    store.buy("grain", 1, 10).unwrap();
    assert_eq!(*delivered.borrow(), 1);
    assert_eq!(store.credits(), 490);
}

#[test]
fn unsubscribe_stops_delivery() {
    let mut store = test_store();
    let hits = Rc::new(RefCell::new(0));

    let count = Rc::clone(&hits);
    let id = store.subscribe(
        ChangeKind::Fuel,
        Box::new(move |_| *count.borrow_mut() += 1),
    );

    store.refuel(0.0).unwrap_err(); // rejected: no notification
    assert_eq!(*hits.borrow(), 0);

    store.settle_jump(1, &NullNav).unwrap(); // fires FuelChanged
    assert_eq!(*hits.borrow(), 1);

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id)); // second removal is a no-op

    store.settle_jump(0, &NullNav).unwrap();
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn subscribers_only_hear_their_own_channel() {
    let mut store = test_store();
    let wrong_channel = Rc::new(RefCell::new(0));

    let count = Rc::clone(&wrong_channel);
    store.subscribe(
        ChangeKind::Debt,
        Box::new(move |_| *count.borrow_mut() += 1),
    );

    store.buy("grain", 1, 10).unwrap(); // credits + cargo only
    assert_eq!(*wrong_channel.borrow(), 0);

    store.pay_debt(100).unwrap();
    assert_eq!(*wrong_channel.borrow(), 1);
}

#[test]
fn advance_time_fires_time_events_and_knowledge() {
    let mut store = test_store();
    store.dock().unwrap();

    let kinds = Rc::new(RefCell::new(Vec::new()));
    for kind in [ChangeKind::Time, ChangeKind::ActiveEvents, ChangeKind::PriceKnowledge] {
        let log = Rc::clone(&kinds);
        store.subscribe(kind, Box::new(move |e| log.borrow_mut().push(e.kind())));
    }

    store.advance_time(3).unwrap();
    assert_eq!(
        *kinds.borrow(),
        vec![ChangeKind::Time, ChangeKind::ActiveEvents, ChangeKind::PriceKnowledge]
    );
}

/// Navigator stub for the unsubscribe test.
struct NullNav;

impl tradewinds_core::galaxy::Navigator for NullNav {
    fn distance(&self, _: &tradewinds_core::galaxy::StarSystem, _: &tradewinds_core::galaxy::StarSystem) -> f64 {
        1.0
    }
    fn jump_fuel_cost(&self, _: f64, _: f64) -> f64 {
        1.0
    }
    fn jump_time_days(&self, _: f64, _: f64) -> u64 {
        1
    }
}
