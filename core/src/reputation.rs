//! Reputation ledger — per-NPC relationship state.
//!
//! Independent of pricing. Trust and quirk modifiers scale positive
//! deltas only; negative outcomes land at face value. Every call
//! touches last_interaction and bumps the interaction counter exactly
//! once, whether or not the score moved or clamped.

use crate::types::{Day, NpcId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const REP_MIN: i32 = -100;
pub const REP_MAX: i32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcState {
    pub rep: i32,
    pub last_interaction: Day,
    pub flags: BTreeSet<String>,
    pub interactions: u64,
}

impl Default for NpcState {
    fn default() -> Self {
        Self {
            rep: 0,
            last_interaction: 0,
            flags: BTreeSet::new(),
            interactions: 0,
        }
    }
}

/// Outcome of a single modify_rep call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepChange {
    pub old_rep: i32,
    pub new_rep: i32,
    /// The delta after trust and quirk scaling, before clamping.
    pub effective_delta: i32,
}

/// Apply a reputation delta.
///
/// Positive deltas: round(raw × trust), then the product of all active
/// quirk modifiers, rounded once at the end — so quirk application
/// order cannot change the result. Negative or zero deltas pass
/// through untouched.
pub fn modify_rep(
    npc: &mut NpcState,
    raw_delta: i32,
    trust: f64,
    quirk_modifiers: &[f64],
    current_day: Day,
) -> RepChange {
    let effective_delta = if raw_delta > 0 {
        let trusted = (f64::from(raw_delta) * trust).round();
        let quirked: f64 = quirk_modifiers.iter().product::<f64>() * trusted;
        quirked.round() as i32
    } else {
        raw_delta
    };

    let old_rep = npc.rep;
    npc.rep = (old_rep + effective_delta).clamp(REP_MIN, REP_MAX);
    npc.last_interaction = current_day;
    npc.interactions += 1;

    RepChange {
        old_rep,
        new_rep: npc.rep,
        effective_delta,
    }
}

/// Append a story flag; set semantics, no duplicates.
/// Returns true if the flag was newly added.
pub fn add_flag(npc: &mut NpcState, flag: &str) -> bool {
    npc.flags.insert(flag.to_string())
}

/// Display band over the score. Never stored — derived on demand for
/// dialogue gating and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepTier {
    Hostile,
    Unfriendly,
    Neutral,
    Friendly,
    Trusted,
}

impl RepTier {
    pub fn from_score(rep: i32) -> Self {
        match rep {
            i32::MIN..=-60 => Self::Hostile,
            -59..=-20 => Self::Unfriendly,
            -19..=19 => Self::Neutral,
            20..=59 => Self::Friendly,
            _ => Self::Trusted,
        }
    }
}

/// Helper for logging rep changes against an NPC id.
pub fn log_change(npc_id: &NpcId, reason: &str, change: &RepChange, day: Day) {
    log::debug!(
        "day={day} reputation: {npc_id} {} -> {} ({:+}) [{reason}]",
        change.old_rep,
        change.new_rep,
        change.effective_delta
    );
}
