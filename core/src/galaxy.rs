//! Static star catalog and the navigation boundary.
//!
//! RULE: The catalog is read-only input data. The core never generates
//! systems and never edits them; it only reads coordinates.
//!
//! Spectral class and station count travel with the catalog for the
//! presentation layer's benefit, but pricing must never read them —
//! that exclusion is pinned down by tests.

use crate::{
    error::{CoreError, CoreResult},
    types::SystemId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarSystem {
    pub id: SystemId,
    pub name: String,
    /// Map-unit coordinates, origin at the galactic core.
    pub coords: [f64; 3],
    pub spectral_class: String,
    pub station_count: u32,
}

impl StarSystem {
    /// Straight-line distance from the map origin, in map units.
    /// Drives tech level and fuel price tiers.
    pub fn distance_from_origin(&self) -> f64 {
        let [x, y, z] = self.coords;
        (x * x + y * y + z * z).sqrt()
    }
}

/// Read-only lookup over the star catalog.
#[derive(Debug, Clone)]
pub struct StarChart {
    systems: BTreeMap<SystemId, StarSystem>,
}

impl StarChart {
    pub fn new(systems: Vec<StarSystem>) -> Self {
        Self {
            systems: systems.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    pub fn get(&self, id: SystemId) -> Option<&StarSystem> {
        self.systems.get(&id)
    }

    pub fn require(&self, id: SystemId) -> CoreResult<&StarSystem> {
        self.systems.get(&id).ok_or(CoreError::UnknownSystem(id))
    }

    /// Systems in stable ascending-id order.
    pub fn iter(&self) -> impl Iterator<Item = &StarSystem> {
        self.systems.values()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

/// The navigation collaborator. Jump geometry and fuel math live
/// outside the core; the store only consumes these as pure functions
/// when pricing fuel tiers and settling a jump's side effects.
pub trait Navigator {
    /// Straight-line distance between two systems, in map units.
    fn distance(&self, a: &StarSystem, b: &StarSystem) -> f64;

    /// Fuel units consumed by a jump of `distance` with the engine at
    /// `engine_condition` (0..=100).
    fn jump_fuel_cost(&self, distance: f64, engine_condition: f64) -> f64;

    /// In-game days a jump of `distance` takes.
    fn jump_time_days(&self, distance: f64, engine_condition: f64) -> u64;
}
