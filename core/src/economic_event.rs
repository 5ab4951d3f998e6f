//! Economic event lifecycle — transient, time-bounded price shocks.
//!
//! Expiration is a hard invariant: an event with end_day < current_day
//! is gone, an event ending exactly on current_day is still live, and
//! a system never hosts more than one live event. Spawn probability,
//! duration, and magnitude are configuration (config.rs), not
//! invariants.

use crate::{
    config::EventConfig,
    rng::StreamRng,
    types::{Day, GoodId, SystemId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SupplyShock,
    DemandSurge,
    SurplusGlut,
    Embargo,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SupplyShock => "supply shock",
            Self::DemandSurge => "demand surge",
            Self::SurplusGlut => "surplus glut",
            Self::Embargo => "embargo",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicEvent {
    /// Deterministic id: "evt-{system}-{start_day}".
    pub id: String,
    pub kind: EventKind,
    pub system_id: SystemId,
    pub start_day: Day,
    /// Inclusive: the event is still active on this day.
    pub end_day: Day,
    /// Price multiplier per affected good, always > 0.
    pub modifiers: BTreeMap<GoodId, f64>,
}

/// Drop every event with end_day < current_day. The boundary is
/// exclusive-below: end_day == current_day keeps the event.
pub fn remove_expired(events: Vec<EconomicEvent>, current_day: Day) -> Vec<EconomicEvent> {
    events
        .into_iter()
        .filter(|e| e.end_day >= current_day)
        .collect()
}

/// First (and by invariant only) active event at a system.
pub fn active_event(events: &[EconomicEvent], system_id: SystemId) -> Option<&EconomicEvent> {
    events.iter().find(|e| e.system_id == system_id)
}

/// Roll spawn chances for every system without a live event. New
/// events start today with a random kind, duration, and per-good
/// modifier set drawn from config ranges. Iteration order is the
/// caller's stable system order, so a fixed seed reproduces spawns.
pub fn maybe_spawn(
    config: &EventConfig,
    goods: &[GoodId],
    system_ids: &[SystemId],
    current_day: Day,
    events: &mut Vec<EconomicEvent>,
    rng: &mut StreamRng,
) -> usize {
    let mut spawned = 0;
    for &system_id in system_ids {
        if active_event(events, system_id).is_some() {
            continue;
        }
        if !rng.chance(config.spawn_chance) {
            continue;
        }
        if let Some(event) = roll_event(config, goods, system_id, current_day, rng) {
            log::info!(
                "day={current_day} events: {} at system {system_id} until day {} ({} goods)",
                event.kind.label(),
                event.end_day,
                event.modifiers.len()
            );
            events.push(event);
            spawned += 1;
        }
    }
    spawned
}

fn roll_event(
    config: &EventConfig,
    goods: &[GoodId],
    system_id: SystemId,
    current_day: Day,
    rng: &mut StreamRng,
) -> Option<EconomicEvent> {
    if goods.is_empty() || config.kinds.is_empty() {
        return None;
    }

    // Weighted kind choice.
    let total_weight: f64 = config.kinds.iter().map(|k| k.weight).sum();
    let mut roll = rng.range_f64(0.0, total_weight);
    let mut chosen = &config.kinds[config.kinds.len() - 1];
    for kind in &config.kinds {
        if roll < kind.weight {
            chosen = kind;
            break;
        }
        roll -= kind.weight;
    }

    let span = config.max_duration_days.saturating_sub(config.min_duration_days);
    let duration = config.min_duration_days.max(1) + if span > 0 { rng.next_u64_below(span + 1) } else { 0 };

    let max_affected = (config.max_goods_affected as u64).min(goods.len() as u64).max(1);
    let min_affected = (config.min_goods_affected as u64).clamp(1, max_affected);
    let affected_span = max_affected - min_affected;
    let count = min_affected + if affected_span > 0 { rng.next_u64_below(affected_span + 1) } else { 0 };

    let mut modifiers = BTreeMap::new();
    // Distinct goods by index roll; the map de-duplicates repeats.
    while (modifiers.len() as u64) < count {
        let good = &goods[rng.next_u64_below(goods.len() as u64) as usize];
        modifiers
            .entry(good.clone())
            .or_insert_with(|| rng.range_f64(chosen.min_mult, chosen.max_mult));
    }

    Some(EconomicEvent {
        id: format!("evt-{system_id}-{current_day}"),
        kind: chosen.kind,
        system_id,
        start_day: current_day,
        end_day: current_day + duration,
        modifiers,
    })
}
