//! Price-intel tests — purchased knowledge of remote markets, and the
//! undock presentation hook.

use tradewinds_core::{
    config::GameConfig,
    save::MemorySaveStore,
    store::{GameStateStore, Rejection},
};

fn test_store() -> GameStateStore {
    GameStateStore::new_game(
        GameConfig::default_test(),
        Box::new(MemorySaveStore::new()),
        42,
    )
}

#[test]
fn intel_snapshots_a_remote_system_without_travel() {
    let mut store = test_store();
    assert!(store.state().world.price_knowledge.get(&2).is_none());

    store.buy_price_intel(2, 50).unwrap();
    assert_eq!(store.credits(), 450);
    let knowledge = store.state().world.price_knowledge.get(&2).unwrap();
    assert_eq!(knowledge.last_visit, 0);
    assert!(!knowledge.prices.is_empty());
    // Bought knowledge is not a visit.
    assert!(!store.state().world.visited_systems.contains(&2));
}

#[test]
fn free_intel_is_allowed() {
    let mut store = test_store();
    store.buy_price_intel(1, 0).unwrap();
    assert_eq!(store.credits(), 500);
    assert!(store.state().world.price_knowledge.contains_key(&1));
}

#[test]
fn intel_rejections_leave_state_untouched() {
    let mut store = test_store();
    let snapshot = serde_json::to_string(store.state()).unwrap();

    assert_eq!(
        store.buy_price_intel(2, 600).unwrap_err(),
        Rejection::InsufficientCredits {
            required: 600,
            available: 500
        }
    );
    assert_eq!(
        store.buy_price_intel(99, 10).unwrap_err(),
        Rejection::UnknownSystem(99)
    );
    assert_eq!(
        store.buy_price_intel(2, -5).unwrap_err(),
        Rejection::InvalidAmount
    );
    assert_eq!(serde_json::to_string(store.state()).unwrap(), snapshot);
}

#[test]
fn intel_ages_like_any_other_knowledge() {
    let mut store = test_store();
    store.buy_price_intel(2, 10).unwrap();

    store.advance_time(4).unwrap();
    let knowledge = store.state().world.price_knowledge.get(&2).unwrap();
    assert_eq!(knowledge.last_visit, 4);
}

#[test]
fn undock_leaves_the_document_untouched() {
    let mut store = test_store();
    store.dock().unwrap();
    let snapshot = serde_json::to_string(store.state()).unwrap();

    store.undock();
    assert_eq!(serde_json::to_string(store.state()).unwrap(), snapshot);
}
