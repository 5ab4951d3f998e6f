//! Reputation ledger tests — trust scaling, quirk composition,
//! clamping, and ledger isolation.

use tradewinds_core::{
    config::GameConfig,
    reputation::{modify_rep, NpcState, RepTier},
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
fn positive_deltas_scale_by_trust() {
    // broker_ilsa has trust 0.5 in the test config.
    let mut store = test_store();
    let change = store.modify_rep("broker_ilsa", 10, "fair deal").unwrap();
    assert_eq!(change.effective_delta, 5);
    assert_eq!(store.npc_state("broker_ilsa").unwrap().rep, 5);
}

#[test]
fn negative_deltas_pass_through_untouched() {
    // Trust never softens a hit.
    let mut store = test_store();
    let change = store.modify_rep("broker_ilsa", -10, "spilled cargo").unwrap();
    assert_eq!(change.effective_delta, -10);
    assert_eq!(store.npc_state("broker_ilsa").unwrap().rep, -10);
}

#[test]
fn rep_clamps_at_both_ends() {
    let mut npc = NpcState::default();
    modify_rep(&mut npc, 500, 1.0, &[], 0);
    assert_eq!(npc.rep, 100);

    modify_rep(&mut npc, -500, 1.0, &[], 1);
    assert_eq!(npc.rep, -100);
}

#[test]
fn interactions_count_every_call_exactly_once() {
    let mut npc = NpcState::default();
    modify_rep(&mut npc, 5, 1.0, &[], 3);
    modify_rep(&mut npc, -5, 1.0, &[], 3); // same day, opposite sign
    modify_rep(&mut npc, 0, 1.0, &[], 4); // zero delta still counts
    modify_rep(&mut npc, 1000, 1.0, &[], 5); // clamped still counts

    assert_eq!(npc.interactions, 4);
    assert_eq!(npc.last_interaction, 5);
}

#[test]
fn quirk_modifiers_amplify_positive_deltas_only() {
    let mut npc = NpcState::default();
    let change = modify_rep(&mut npc, 10, 1.0, &[1.5], 0);
    assert_eq!(change.effective_delta, 15);

    let change = modify_rep(&mut npc, -10, 1.0, &[1.5], 1);
    assert_eq!(change.effective_delta, -10);
}

#[test]
fn quirk_composition_is_commutative() {
    let mut a = NpcState::default();
    let mut b = NpcState::default();
    let forward = modify_rep(&mut a, 7, 0.8, &[1.5, 2.0], 0);
    let reverse = modify_rep(&mut b, 7, 0.8, &[2.0, 1.5], 0);

    assert_eq!(forward.effective_delta, reverse.effective_delta);
    assert_eq!(a.rep, b.rep);
}

#[test]
fn store_applies_ship_quirk_modifiers() {
    let mut store = test_store();
    // Quirks land on the ship through migration/upgrades in play; for
    // the ledger all that matters is which ids are present.
    let change = store.modify_rep("dockmaster_vey", 10, "on-time delivery").unwrap();
    assert_eq!(change.effective_delta, 10); // no quirks yet
    assert_eq!(store.npc_state("dockmaster_vey").unwrap().rep, 10);
}

#[test]
fn two_npc_ledgers_never_cross_contaminate() {
    let mut store = test_store();
    store.modify_rep("dockmaster_vey", 20, "helped at the dock").unwrap();
    store.modify_rep("broker_ilsa", -30, "walked out on a deal").unwrap();

    let vey = store.npc_state("dockmaster_vey").unwrap();
    let ilsa = store.npc_state("broker_ilsa").unwrap();
    assert_eq!((vey.rep, vey.interactions), (20, 1));
    assert_eq!((ilsa.rep, ilsa.interactions), (-30, 1));
}

#[test]
fn unknown_npc_is_rejected() {
    let mut store = test_store();
    assert_eq!(
        store.modify_rep("nobody", 5, "?").unwrap_err(),
        Rejection::UnknownNpc("nobody".into())
    );
}

#[test]
fn story_flags_have_set_semantics() {
    let mut store = test_store();
    assert!(store.add_story_flag("broker_ilsa", "met_at_bar").unwrap());
    assert!(!store.add_story_flag("broker_ilsa", "met_at_bar").unwrap());
    assert!(store.add_story_flag("broker_ilsa", "owes_favor").unwrap());

    let flags = &store.npc_state("broker_ilsa").unwrap().flags;
    assert_eq!(flags.len(), 2);
    assert!(flags.contains("met_at_bar"));
}

#[test]
fn rep_tiers_band_the_score() {
    assert_eq!(RepTier::from_score(-100), RepTier::Hostile);
    assert_eq!(RepTier::from_score(-60), RepTier::Hostile);
    assert_eq!(RepTier::from_score(-59), RepTier::Unfriendly);
    assert_eq!(RepTier::from_score(0), RepTier::Neutral);
    assert_eq!(RepTier::from_score(19), RepTier::Neutral);
    assert_eq!(RepTier::from_score(20), RepTier::Friendly);
    assert_eq!(RepTier::from_score(60), RepTier::Trusted);
    assert_eq!(RepTier::from_score(100), RepTier::Trusted);
}

#[test]
fn last_interaction_tracks_the_store_clock() {
    let mut store = test_store();
    store.advance_time(12).unwrap();
    store.modify_rep("dockmaster_vey", 1, "small talk").unwrap();
    assert_eq!(store.npc_state("dockmaster_vey").unwrap().last_interaction, 12);
}
