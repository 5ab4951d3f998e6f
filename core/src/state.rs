//! The game-state document — one per save slot.
//!
//! RULE: GameStateStore exclusively owns the live document. Components
//! (pricing, market, events, reputation) receive the slices they need
//! as arguments and return computed values; nothing aliases mutable
//! state across calls.

use crate::{
    config::GameConfig,
    economic_event::EconomicEvent,
    market::PressureMap,
    reputation::NpcState,
    types::{Credits, Day, GoodId, NpcId, SystemId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Current save-document schema version.
pub const SCHEMA_VERSION: &str = "2.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub credits: Credits,
    pub debt: Credits,
    pub current_system: SystemId,
    /// Monotonically non-decreasing.
    pub days_elapsed: Day,
}

/// One lot of cargo bought at a single price. A stack with quantity 0
/// must not exist — selling a stack out removes it from the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoStack {
    pub good: GoodId,
    pub quantity: u32,
    pub buy_price: Credits,
    pub buy_system: SystemId,
    /// Denormalized for display; the catalog is not consulted at render
    /// time.
    pub buy_system_name: String,
    pub buy_date: Day,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipState {
    /// Clamped [0, 100].
    pub fuel: f64,
    pub cargo_capacity: u32,
    pub cargo: Vec<CargoStack>,
    pub hull: f64,
    pub engine: f64,
    pub life_support: f64,
    pub quirks: BTreeSet<String>,
    pub upgrades: BTreeSet<String>,
    pub hidden_cargo: Vec<CargoStack>,
    pub hidden_cargo_capacity: u32,
}

impl ShipState {
    pub fn cargo_used(&self) -> u32 {
        self.cargo.iter().map(|s| s.quantity).sum()
    }

    pub fn cargo_remaining(&self) -> u32 {
        self.cargo_capacity.saturating_sub(self.cargo_used())
    }

    pub fn hidden_used(&self) -> u32 {
        self.hidden_cargo.iter().map(|s| s.quantity).sum()
    }

    pub fn hidden_remaining(&self) -> u32 {
        self.hidden_cargo_capacity.saturating_sub(self.hidden_used())
    }
}

/// The player's cached, staling view of one system's prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceKnowledge {
    /// Days since this snapshot was taken; 0 on docking.
    pub last_visit: Day,
    pub prices: BTreeMap<GoodId, Credits>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    /// Append-only.
    pub visited_systems: BTreeSet<SystemId>,
    pub price_knowledge: BTreeMap<SystemId, PriceKnowledge>,
    pub active_events: Vec<EconomicEvent>,
    pub market_conditions: PressureMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub version: String,
    pub game_id: String,
    /// Master seed for all deterministic RNG streams.
    pub seed: u64,
    pub last_write: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: PlayerState,
    pub ship: ShipState,
    pub world: WorldState,
    pub npcs: BTreeMap<NpcId, NpcState>,
    pub meta: Meta,
}

impl GameState {
    /// Fresh document seeded from the starting conditions in config.
    /// NPC ledgers start neutral; only the starting system is visited.
    pub fn new_game(config: &GameConfig, seed: u64) -> Self {
        let start = &config.start;
        let npcs = config
            .npcs
            .keys()
            .map(|id| (id.clone(), NpcState::default()))
            .collect();

        Self {
            player: PlayerState {
                credits: start.credits,
                debt: start.debt,
                current_system: start.system,
                days_elapsed: 0,
            },
            ship: ShipState {
                fuel: start.fuel.clamp(0.0, 100.0),
                cargo_capacity: start.cargo_capacity,
                cargo: Vec::new(),
                hull: 100.0,
                engine: 100.0,
                life_support: 100.0,
                quirks: BTreeSet::new(),
                upgrades: BTreeSet::new(),
                hidden_cargo: Vec::new(),
                hidden_cargo_capacity: start.hidden_cargo_capacity,
            },
            world: WorldState {
                visited_systems: BTreeSet::from([start.system]),
                price_knowledge: BTreeMap::new(),
                active_events: Vec::new(),
                market_conditions: PressureMap::new(),
            },
            npcs,
            meta: Meta {
                version: SCHEMA_VERSION.to_string(),
                game_id: uuid::Uuid::new_v4().to_string(),
                seed,
                last_write: None,
            },
        }
    }
}
