//! Pricing engine — the pure price formula.
//!
//! price = round(base × techMod × temporalMod × localMod × eventMod),
//! clamped to >= 1. The five sub-terms are free functions so each is
//! unit-testable on its own; composition is a straight product and
//! rounding happens exactly once, last.
//!
//! RULE: spectral class and station count are never inputs. Only a
//! system's coordinates (via distance from origin) and its numeric id
//! reach the formula. Tests pin this exclusion down.

use crate::{
    config::GoodConfig,
    economic_event::EconomicEvent,
    galaxy::StarSystem,
    market::PressureMap,
    types::{Credits, Day, SystemId},
};

pub const MAX_TECH: f64 = 10.0;
pub const MIN_TECH: f64 = 1.0;
/// Calibration constant: the straight-line distance (map units) at
/// which tech level bottoms out at MIN_TECH.
pub const MAX_COORD_DISTANCE: f64 = 21.0;

pub const TECH_MIDPOINT: f64 = 5.0;
pub const TECH_INTENSITY: f64 = 0.08;

pub const TEMPORAL_AMPLITUDE: f64 = 0.15;
pub const TEMPORAL_PERIOD_DAYS: f64 = 30.0;
/// Staggers the oscillation per system so systems are never in sync.
pub const TEMPORAL_PHASE_OFFSET: f64 = 0.15;

pub const PRESSURE_CAPACITY: f64 = 1000.0;
pub const LOCAL_MOD_MIN: f64 = 0.25;
pub const LOCAL_MOD_MAX: f64 = 2.0;

/// Synthetic 1–10 economic-development scalar, linear in distance from
/// the map origin.
pub fn tech_level(system: &StarSystem) -> f64 {
    let d = system.distance_from_origin();
    let level = MAX_TECH - (MAX_TECH - MIN_TECH) * (d / MAX_COORD_DISTANCE);
    level.clamp(MIN_TECH, MAX_TECH)
}

/// 1.0 exactly at the tech midpoint, regardless of bias.
pub fn tech_mod(bias: f64, tech_level: f64) -> f64 {
    1.0 + (tech_level - TECH_MIDPOINT) * bias * TECH_INTENSITY
}

/// Sinusoidal drift over a 30-day period, phase-staggered by system id.
/// 1.0 exactly at system 0, day 0.
pub fn temporal_mod(system_id: SystemId, day: Day) -> f64 {
    let phase = day as f64 / TEMPORAL_PERIOD_DAYS + f64::from(system_id) * TEMPORAL_PHASE_OFFSET;
    1.0 + TEMPORAL_AMPLITUDE * (std::f64::consts::TAU * phase).sin()
}

/// Player trade pressure discount/premium. Positive pressure (net
/// selling into the system) lowers the price; negative raises it.
pub fn local_mod(system_id: SystemId, good: &str, conditions: &PressureMap) -> f64 {
    let pressure = crate::market::pressure(conditions, system_id, good);
    (1.0 - pressure / PRESSURE_CAPACITY).clamp(LOCAL_MOD_MIN, LOCAL_MOD_MAX)
}

/// Product of the modifiers of every active event at this system that
/// defines one for this good; 1.0 when none apply.
pub fn event_mod(system_id: SystemId, good: &str, active_events: &[EconomicEvent]) -> f64 {
    active_events
        .iter()
        .filter(|e| e.system_id == system_id)
        .filter_map(|e| e.modifiers.get(good))
        .product()
}

/// The full formula. Always returns an integer >= 1.
pub fn calculate_price(
    good: &GoodConfig,
    system: &StarSystem,
    day: Day,
    active_events: &[EconomicEvent],
    conditions: &PressureMap,
) -> Credits {
    let raw = good.base_price as f64
        * tech_mod(good.tech_bias, tech_level(system))
        * temporal_mod(system.id, day)
        * local_mod(system.id, &good.good_id, conditions)
        * event_mod(system.id, &good.good_id, active_events);
    (raw.round() as Credits).max(1)
}
