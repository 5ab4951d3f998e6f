//! Market condition tracker — signed net-trade pressure per system and
//! commodity.
//!
//! The map is sparse: an absent entry means zero pressure. This
//! component cannot fail; it only no-ops on missing entries. The store
//! owns the map inside the save document and hands it here by
//! reference, so nothing in this module holds state across calls.

use crate::types::{GoodId, SystemId};
use std::collections::BTreeMap;

/// system -> good -> signed net pressure. Selling adds, buying subtracts.
pub type PressureMap = BTreeMap<SystemId, BTreeMap<GoodId, f64>>;

/// Daily reversion toward equilibrium: 10% of the remaining pressure
/// per elapsed day.
pub const RECOVERY_FACTOR: f64 = 0.9;

/// Entries whose magnitude decays below this are dropped so the sparse
/// map stays bounded.
pub const PRUNE_THRESHOLD: f64 = 1.0;

/// Record a trade. `signed_quantity` is positive for sales into the
/// system, negative for purchases out of it.
pub fn apply_trade(conditions: &mut PressureMap, system_id: SystemId, good: &str, signed_quantity: f64) {
    let entry = conditions
        .entry(system_id)
        .or_default()
        .entry(good.to_string())
        .or_insert(0.0);
    *entry += signed_quantity;
}

/// Current signed pressure; 0.0 for absent entries.
pub fn pressure(conditions: &PressureMap, system_id: SystemId, good: &str) -> f64 {
    conditions
        .get(&system_id)
        .and_then(|goods| goods.get(good))
        .copied()
        .unwrap_or(0.0)
}

/// Decay every stored pressure value by RECOVERY_FACTOR^days_passed,
/// then prune entries whose magnitude fell below PRUNE_THRESHOLD.
pub fn decay(conditions: &mut PressureMap, days_passed: u64) {
    if days_passed == 0 {
        return;
    }
    let factor = RECOVERY_FACTOR.powi(days_passed as i32);
    for goods in conditions.values_mut() {
        for value in goods.values_mut() {
            *value *= factor;
        }
        goods.retain(|_, v| v.abs() >= PRUNE_THRESHOLD);
    }
    conditions.retain(|_, goods| !goods.is_empty());
}
