//! Market condition tracker tests — pressure accumulation, decay, and
//! pruning.

use tradewinds_core::market::{self, PressureMap, PRUNE_THRESHOLD, RECOVERY_FACTOR};

#[test]
fn trades_accumulate_signed_pressure() {
    let mut conditions = PressureMap::new();

    market::apply_trade(&mut conditions, 0, "grain", 50.0); // sell
    market::apply_trade(&mut conditions, 0, "grain", -20.0); // buy
    assert_eq!(market::pressure(&conditions, 0, "grain"), 30.0);

    // Other systems and goods start at zero and stay untouched.
    assert_eq!(market::pressure(&conditions, 1, "grain"), 0.0);
    assert_eq!(market::pressure(&conditions, 0, "ore"), 0.0);
}

#[test]
fn decay_applies_recovery_factor_per_day() {
    let mut conditions = PressureMap::new();
    market::apply_trade(&mut conditions, 0, "grain", 100.0);

    market::decay(&mut conditions, 1);
    assert!((market::pressure(&conditions, 0, "grain") - 90.0).abs() < 1e-9);

    market::decay(&mut conditions, 3);
    let expected = 90.0 * RECOVERY_FACTOR.powi(3);
    assert!((market::pressure(&conditions, 0, "grain") - expected).abs() < 1e-9);
}

#[test]
fn zero_days_is_a_no_op() {
    let mut conditions = PressureMap::new();
    market::apply_trade(&mut conditions, 2, "ore", -40.0);
    market::decay(&mut conditions, 0);
    assert_eq!(market::pressure(&conditions, 2, "ore"), -40.0);
}

#[test]
fn decayed_entries_below_threshold_are_pruned() {
    let mut conditions = PressureMap::new();
    market::apply_trade(&mut conditions, 0, "grain", 2.0);
    market::apply_trade(&mut conditions, 0, "ore", 500.0);

    // 2.0 * 0.9^8 ≈ 0.86 < 1.0: pruned. The ore entry survives.
    market::decay(&mut conditions, 8);
    assert_eq!(market::pressure(&conditions, 0, "grain"), 0.0);
    assert!(market::pressure(&conditions, 0, "ore") > PRUNE_THRESHOLD);
    assert_eq!(conditions.get(&0).map(|g| g.len()), Some(1));
}

#[test]
fn negative_pressure_prunes_on_magnitude() {
    let mut conditions = PressureMap::new();
    market::apply_trade(&mut conditions, 3, "grain", -2.0);

    market::decay(&mut conditions, 8);
    assert_eq!(market::pressure(&conditions, 3, "grain"), 0.0);
    // The whole system entry disappears once empty: the map stays sparse.
    assert!(conditions.get(&3).is_none());
}
