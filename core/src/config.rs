//! Static configuration loaded from the data/ directory.
//!
//! Tunables live here, invariants live in code: the pricing formula's
//! named constants are part of the contract (pricing.rs), while event
//! spawn odds, fuel tiers, repair cost, and starting conditions are
//! data an operator may retune without touching the core.

use crate::{
    galaxy::StarSystem,
    types::{Credits, Day, GoodId, NpcId, SystemId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodConfig {
    pub good_id: GoodId,
    pub label: String,
    pub base_price: Credits,
    /// Signed tech bias: negative goods are cheaper far from the core,
    /// positive goods are cheaper near it. Fixed per commodity.
    pub tech_bias: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct GoodsCatalogFile {
    goods: Vec<GoodConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct StarCatalogFile {
    systems: Vec<StarSystem>,
}

/// Spawn tunables for one economic event kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventKindConfig {
    pub kind: crate::economic_event::EventKind,
    pub weight: f64,
    pub min_mult: f64,
    pub max_mult: f64,
}

/// Economic-event lifecycle tunables. Expiration semantics are a hard
/// invariant; everything in here is configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Per-system, per-day probability of spawning a new event.
    pub spawn_chance: f64,
    pub min_duration_days: Day,
    pub max_duration_days: Day,
    /// Goods affected per event, chosen uniformly in [min, max].
    pub min_goods_affected: u32,
    pub max_goods_affected: u32,
    pub kinds: Vec<EventKindConfig>,
}

/// One fuel price band: applies to systems whose distance from the
/// origin is <= max_distance. Bands are checked in order; the last
/// band is the catch-all for the rim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelTier {
    pub max_distance: f64,
    pub price_per_unit: Credits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcConfig {
    pub npc_id: NpcId,
    pub name: String,
    pub home_system: SystemId,
    /// Personality trust factor scaling positive reputation deltas.
    pub trust: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct NpcCatalogFile {
    npcs: Vec<NpcConfig>,
    /// Ship quirk id -> multiplier applied to positive rep deltas.
    quirk_rep_modifiers: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct EconomyConfigFile {
    event: EventConfig,
    fuel_tiers: Vec<FuelTier>,
    repair_cost_per_percent: Credits,
    debounce_window_ms: i64,
    start: StartConfig,
}

/// New-game starting conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConfig {
    pub credits: Credits,
    pub debt: Credits,
    pub system: SystemId,
    pub fuel: f64,
    pub cargo_capacity: u32,
    pub hidden_cargo_capacity: u32,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub goods: BTreeMap<GoodId, GoodConfig>,
    pub systems: Vec<StarSystem>,
    pub event: EventConfig,
    pub fuel_tiers: Vec<FuelTier>,
    pub repair_cost_per_percent: Credits,
    pub npcs: BTreeMap<NpcId, NpcConfig>,
    pub quirk_rep_modifiers: BTreeMap<String, f64>,
    pub debounce_window_ms: i64,
    pub start: StartConfig,
}

impl GameConfig {
    /// Load from the data/ directory.
    /// In tests, use GameConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let goods_path = format!("{data_dir}/goods/goods_catalog.json");
        let goods_content = std::fs::read_to_string(&goods_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {goods_path}: {e}"))?;
        let goods_file: GoodsCatalogFile = serde_json::from_str(&goods_content)?;
        let goods = goods_file
            .goods
            .into_iter()
            .map(|g| (g.good_id.clone(), g))
            .collect();

        let star_path = format!("{data_dir}/galaxy/star_catalog.json");
        let star_content = std::fs::read_to_string(&star_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {star_path}: {e}"))?;
        let star_file: StarCatalogFile = serde_json::from_str(&star_content)?;

        let npc_path = format!("{data_dir}/npcs/npc_catalog.json");
        let npc_content = std::fs::read_to_string(&npc_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {npc_path}: {e}"))?;
        let npc_file: NpcCatalogFile = serde_json::from_str(&npc_content)?;
        let npcs = npc_file
            .npcs
            .into_iter()
            .map(|n| (n.npc_id.clone(), n))
            .collect();

        let econ_path = format!("{data_dir}/economy/economy_config.json");
        let econ_content = std::fs::read_to_string(&econ_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {econ_path}: {e}"))?;
        let econ: EconomyConfigFile = serde_json::from_str(&econ_content)?;

        Ok(Self {
            goods,
            systems: star_file.systems,
            event: econ.event,
            fuel_tiers: econ.fuel_tiers,
            repair_cost_per_percent: econ.repair_cost_per_percent,
            npcs,
            quirk_rep_modifiers: npc_file.quirk_rep_modifiers,
            debounce_window_ms: econ.debounce_window_ms,
            start: econ.start,
        })
    }

    /// Small fixed config used by the integration tests: four goods,
    /// four systems at known distances, two NPCs, generous start funds.
    pub fn default_test() -> Self {
        use crate::economic_event::EventKind;

        let goods = vec![
            GoodConfig {
                good_id: "grain".into(),
                label: "Grain".into(),
                base_price: 10,
                tech_bias: -1.0,
            },
            GoodConfig {
                good_id: "ore".into(),
                label: "Raw Ore".into(),
                base_price: 35,
                tech_bias: -0.5,
            },
            GoodConfig {
                good_id: "medicine".into(),
                label: "Medicine".into(),
                base_price: 80,
                tech_bias: 0.5,
            },
            GoodConfig {
                good_id: "processors".into(),
                label: "Processors".into(),
                base_price: 120,
                tech_bias: 1.0,
            },
        ];

        let systems = vec![
            StarSystem {
                id: 0,
                name: "Meridian".into(),
                coords: [0.0, 0.0, 0.0],
                spectral_class: "G".into(),
                station_count: 3,
            },
            StarSystem {
                id: 1,
                name: "Halvard".into(),
                coords: [7.0, 0.0, 0.0],
                spectral_class: "K".into(),
                station_count: 1,
            },
            StarSystem {
                id: 2,
                // Distance 11.67 from origin: tech level lands exactly
                // on the midpoint, so techMod is 1.0 for every good.
                name: "Crossing".into(),
                coords: [11.67, 0.0, 0.0],
                spectral_class: "M".into(),
                station_count: 1,
            },
            StarSystem {
                id: 3,
                name: "Farhollow".into(),
                coords: [12.0, 12.0, 9.0],
                spectral_class: "M".into(),
                station_count: 0,
            },
        ];

        let npcs = vec![
            NpcConfig {
                npc_id: "dockmaster_vey".into(),
                name: "Dockmaster Vey".into(),
                home_system: 0,
                trust: 1.0,
            },
            NpcConfig {
                npc_id: "broker_ilsa".into(),
                name: "Broker Ilsa".into(),
                home_system: 1,
                trust: 0.5,
            },
        ];

        let mut quirk_rep_modifiers = BTreeMap::new();
        quirk_rep_modifiers.insert("famous_hull".into(), 1.5);
        quirk_rep_modifiers.insert("smugglers_rep".into(), 2.0);

        Self {
            goods: goods.into_iter().map(|g| (g.good_id.clone(), g)).collect(),
            systems,
            event: EventConfig {
                spawn_chance: 0.10,
                min_duration_days: 3,
                max_duration_days: 10,
                min_goods_affected: 1,
                max_goods_affected: 2,
                kinds: vec![
                    EventKindConfig {
                        kind: EventKind::SupplyShock,
                        weight: 1.0,
                        min_mult: 1.4,
                        max_mult: 2.2,
                    },
                    EventKindConfig {
                        kind: EventKind::DemandSurge,
                        weight: 1.0,
                        min_mult: 1.2,
                        max_mult: 1.8,
                    },
                    EventKindConfig {
                        kind: EventKind::SurplusGlut,
                        weight: 1.0,
                        min_mult: 0.5,
                        max_mult: 0.85,
                    },
                    EventKindConfig {
                        kind: EventKind::Embargo,
                        weight: 0.5,
                        min_mult: 1.8,
                        max_mult: 3.0,
                    },
                ],
            },
            fuel_tiers: vec![
                FuelTier {
                    max_distance: 5.0,
                    price_per_unit: 2,
                },
                FuelTier {
                    max_distance: 12.0,
                    price_per_unit: 3,
                },
                FuelTier {
                    max_distance: f64::MAX,
                    price_per_unit: 5,
                },
            ],
            repair_cost_per_percent: 4,
            npcs: npcs.into_iter().map(|n| (n.npc_id.clone(), n)).collect(),
            quirk_rep_modifiers,
            debounce_window_ms: 1000,
            start: StartConfig {
                credits: 500,
                debt: 1000,
                system: 0,
                fuel: 100.0,
                cargo_capacity: 50,
                hidden_cargo_capacity: 5,
            },
        }
    }
}
