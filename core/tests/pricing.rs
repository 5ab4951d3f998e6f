//! Pricing engine tests — the five sub-terms and their composition.

use std::collections::BTreeMap;
use tradewinds_core::{
    config::GoodConfig,
    economic_event::{EconomicEvent, EventKind},
    galaxy::StarSystem,
    market::PressureMap,
    pricing,
};

fn system(id: u32, coords: [f64; 3]) -> StarSystem {
    StarSystem {
        id,
        name: format!("sys-{id}"),
        coords,
        spectral_class: "G".into(),
        station_count: 1,
    }
}

fn good(id: &str, base_price: i64, tech_bias: f64) -> GoodConfig {
    GoodConfig {
        good_id: id.into(),
        label: id.into(),
        base_price,
        tech_bias,
    }
}

fn event(system_id: u32, modifiers: &[(&str, f64)]) -> EconomicEvent {
    EconomicEvent {
        id: format!("evt-{system_id}-0"),
        kind: EventKind::SupplyShock,
        system_id,
        start_day: 0,
        end_day: 10,
        modifiers: modifiers
            .iter()
            .map(|(g, m)| (g.to_string(), *m))
            .collect(),
    }
}

#[test]
fn tech_level_linear_in_distance_and_clamped() {
    let origin = system(0, [0.0, 0.0, 0.0]);
    assert_eq!(pricing::tech_level(&origin), pricing::MAX_TECH);

    let rim = system(1, [30.0, 0.0, 0.0]); // beyond the 21-unit calibration
    assert_eq!(pricing::tech_level(&rim), pricing::MIN_TECH);

    let halfway = system(2, [10.5, 0.0, 0.0]);
    let expected = 10.0 - 9.0 * (10.5 / 21.0);
    assert!((pricing::tech_level(&halfway) - expected).abs() < 1e-12);
}

/// A system at distance 11.67 sits within a hair of tech level 5.0; at
/// exactly the midpoint, techMod is 1.0 for every commodity bias.
#[test]
fn tech_mod_is_one_at_midpoint_for_any_bias() {
    for bias in [-1.0, -0.5, 0.0, 0.5, 1.0] {
        assert_eq!(pricing::tech_mod(bias, pricing::TECH_MIDPOINT), 1.0);
    }
    let crossing = system(3, [11.67, 0.0, 0.0]);
    assert!((pricing::tech_level(&crossing) - 5.0).abs() < 0.01);
}

#[test]
fn tech_mod_sign_follows_bias() {
    // Negative bias: cheaper near the core (high tech), dearer at the rim.
    assert!(pricing::tech_mod(-1.0, 10.0) < 1.0);
    assert!(pricing::tech_mod(-1.0, 1.0) > 1.0);
    // Positive bias: the reverse.
    assert!(pricing::tech_mod(1.0, 10.0) > 1.0);
    assert!(pricing::tech_mod(1.0, 1.0) < 1.0);
}

#[test]
fn temporal_mod_is_one_at_system_zero_day_zero() {
    assert!((pricing::temporal_mod(0, 0) - 1.0).abs() < 1e-12);
}

#[test]
fn temporal_mod_staggers_by_system_id() {
    // On the same day, differently-phased systems disagree.
    let day = 7;
    assert!((pricing::temporal_mod(0, day) - pricing::temporal_mod(1, day)).abs() > 1e-6);
}

#[test]
fn temporal_mod_stays_within_amplitude() {
    for day in 0..90 {
        for sys in 0..8 {
            let m = pricing::temporal_mod(sys, day);
            assert!(m >= 1.0 - pricing::TEMPORAL_AMPLITUDE - 1e-12);
            assert!(m <= 1.0 + pricing::TEMPORAL_AMPLITUDE + 1e-12);
        }
    }
}

#[test]
fn local_mod_direction_and_clamps() {
    let mut conditions = PressureMap::new();
    // No entry: neutral.
    assert_eq!(pricing::local_mod(0, "grain", &conditions), 1.0);

    // Net selling into the system lowers the price.
    conditions.entry(0).or_default().insert("grain".into(), 500.0);
    assert_eq!(pricing::local_mod(0, "grain", &conditions), 0.5);

    // Extreme pressure clamps at the floor.
    conditions.entry(0).or_default().insert("grain".into(), 10_000.0);
    assert_eq!(pricing::local_mod(0, "grain", &conditions), pricing::LOCAL_MOD_MIN);

    // Net buying raises it, clamped at the ceiling.
    conditions.entry(0).or_default().insert("grain".into(), -10_000.0);
    assert_eq!(pricing::local_mod(0, "grain", &conditions), pricing::LOCAL_MOD_MAX);
}

#[test]
fn event_mod_defaults_to_one_and_multiplies_matches() {
    let events = vec![event(0, &[("grain", 2.0)]), event(1, &[("grain", 3.0)])];

    // No matching event for this good.
    assert_eq!(pricing::event_mod(0, "ore", &events), 1.0);
    // Wrong system's event never leaks in.
    assert_eq!(pricing::event_mod(0, "grain", &events), 2.0);
    assert_eq!(pricing::event_mod(1, "grain", &events), 3.0);
    // No events at all.
    assert_eq!(pricing::event_mod(2, "grain", &events), 1.0);
}

#[test]
fn price_is_the_rounded_product_of_all_five_terms() {
    let sys = system(2, [6.0, 3.0, 2.0]);
    let g = good("ore", 35, -0.5);
    let mut conditions = PressureMap::new();
    conditions.entry(2).or_default().insert("ore".into(), 120.0);
    let events = vec![event(2, &[("ore", 1.5)])];
    let day = 17;

    let expected_raw = 35.0
        * pricing::tech_mod(-0.5, pricing::tech_level(&sys))
        * pricing::temporal_mod(2, day)
        * pricing::local_mod(2, "ore", &conditions)
        * pricing::event_mod(2, "ore", &events);
    let expected = (expected_raw.round() as i64).max(1);

    assert_eq!(pricing::calculate_price(&g, &sys, day, &events, &conditions), expected);
}

#[test]
fn price_never_drops_below_one() {
    let sys = system(0, [0.0, 0.0, 0.0]);
    let g = good("scrap", 1, -1.0);
    let mut conditions = PressureMap::new();
    conditions.entry(0).or_default().insert("scrap".into(), 100_000.0);
    let events = vec![event(0, &[("scrap", 0.01)])];

    for day in 0..60 {
        assert!(pricing::calculate_price(&g, &sys, day, &events, &conditions) >= 1);
    }
}

/// Spectral class and station count must be provably excluded from the
/// formula: same coordinates, wildly different catalog dressing, same
/// price.
#[test]
fn price_ignores_spectral_class_and_station_count() {
    let plain = system(4, [5.0, 5.0, 5.0]);
    let mut dressed = plain.clone();
    dressed.spectral_class = "O".into();
    dressed.station_count = 99;

    let g = good("medicine", 80, 0.5);
    let conditions = PressureMap::new();
    let events: Vec<EconomicEvent> = Vec::new();

    for day in [0, 11, 29, 53] {
        assert_eq!(
            pricing::calculate_price(&g, &plain, day, &events, &conditions),
            pricing::calculate_price(&g, &dressed, day, &events, &conditions),
        );
    }
}

#[test]
fn event_modifiers_compose_as_a_product() {
    let mut modifiers = BTreeMap::new();
    modifiers.insert("grain".to_string(), 2.0);
    let a = EconomicEvent {
        id: "evt-0-0".into(),
        kind: EventKind::SupplyShock,
        system_id: 0,
        start_day: 0,
        end_day: 5,
        modifiers,
    };
    let mut b = a.clone();
    b.id = "evt-0-1".into();
    b.modifiers.insert("grain".to_string(), 1.5);

    // Two events at one system cannot coexist in live play, but the
    // formula itself is a plain product over whatever it is handed.
    let events = vec![a, b];
    assert_eq!(pricing::event_mod(0, "grain", &events), 3.0);
}
