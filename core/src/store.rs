//! The game-state store — the heart of Tradewinds.
//!
//! Every mutation follows the same shape, never reordered:
//!   1. validate preconditions
//!   2. compute deltas via the pricing / market / event / reputation
//!      components
//!   3. mutate the document
//!   4. emit change notifications
//!   5. persist (trade, refuel, repair, dock, jump settlement)
//!
//! RULES:
//!   - Validation failures are Rejection values, never errors, and
//!     leave the document bit-identical to before the call.
//!   - Mutations are single-writer and run to completion; a jump's
//!     state settlement commits (and persists) before any presentation
//!     animation can observe it.
//!   - Persistence is debounced and best-effort; save_now(true) is the
//!     durability escape hatch.

use crate::{
    config::GameConfig,
    economic_event,
    error::{CoreError, CoreResult},
    galaxy::{Navigator, StarChart},
    market,
    migrate,
    observer::{ChangeEvent, ChangeKind, ObserverRegistry, SubscriberId},
    pricing,
    reputation::{self, NpcState, RepChange, RepTier},
    rng::{RngBank, StreamSlot},
    save::{SaveBackend, WriteOutcome, SAVE_KEY},
    state::{CargoStack, GameState, PriceKnowledge},
    types::{Credits, Day, GoodId, NpcId, SystemId},
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fmt;

pub const FUEL_CAPACITY: f64 = 100.0;
/// Floating-point tolerance on fuel capacity checks.
pub const FUEL_EPSILON: f64 = 1e-6;

/// Repairable ship sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipSection {
    Hull,
    Engine,
    LifeSupport,
}

/// A validation failure. Returned, never thrown; the document is
/// untouched whenever one of these comes back.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    InsufficientCredits { required: Credits, available: Credits },
    InsufficientCargoSpace { requested: u32, available: u32 },
    InsufficientHiddenSpace { requested: u32, available: u32 },
    InvalidStackIndex { index: usize },
    InvalidQuantity { quantity: u32 },
    InvalidPrice { price: Credits },
    InvalidAmount,
    ExceedsFuelCapacity { current: f64, requested: f64 },
    InsufficientFuel { required: f64, available: f64 },
    UnknownGood(GoodId),
    UnknownSystem(SystemId),
    UnknownNpc(NpcId),
    AlreadyThere(SystemId),
    TimeNotForward { current: Day, requested: Day },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientCredits { required, available } => {
                write!(f, "insufficient credits: need {required}, have {available}")
            }
            Self::InsufficientCargoSpace { requested, available } => {
                write!(f, "insufficient cargo space: need {requested}, have {available}")
            }
            Self::InsufficientHiddenSpace { requested, available } => {
                write!(f, "insufficient hidden cargo space: need {requested}, have {available}")
            }
            Self::InvalidStackIndex { index } => write!(f, "invalid cargo stack index {index}"),
            Self::InvalidQuantity { quantity } => write!(f, "invalid quantity {quantity}"),
            Self::InvalidPrice { price } => write!(f, "invalid unit price {price}"),
            Self::InvalidAmount => write!(f, "amount must be positive"),
            Self::ExceedsFuelCapacity { .. } => write!(f, "cannot exceed capacity"),
            Self::InsufficientFuel { required, available } => {
                write!(f, "insufficient fuel: need {required:.1}, have {available:.1}")
            }
            Self::UnknownGood(good) => write!(f, "unknown good: {good}"),
            Self::UnknownSystem(id) => write!(f, "unknown system: {id}"),
            Self::UnknownNpc(id) => write!(f, "unknown npc: {id}"),
            Self::AlreadyThere(id) => write!(f, "already at system {id}"),
            Self::TimeNotForward { current, requested } => {
                write!(f, "day must advance: at {current}, requested {requested}")
            }
        }
    }
}

pub type TxResult<T> = Result<T, Rejection>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyReceipt {
    pub cost: Credits,
    /// Index of the stack the goods landed in.
    pub stack_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellReceipt {
    pub earned: Credits,
    /// Per-unit spread over the stack's buy price.
    pub profit_margin: Credits,
    pub stack_removed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefuelReceipt {
    pub cost: Credits,
    pub new_fuel: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepairReceipt {
    pub cost: Credits,
    pub new_condition: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpReceipt {
    pub distance: f64,
    pub fuel_spent: f64,
    pub days_in_transit: Day,
}

/// Central orchestrator. Exclusively owns the live game-state
/// document; everything else sees slices or clones.
pub struct GameStateStore {
    config: GameConfig,
    chart: StarChart,
    backend: Box<dyn SaveBackend>,
    observers: ObserverRegistry,
    rng: RngBank,
    state: GameState,
}

impl GameStateStore {
    /// Start a fresh game, ignoring any existing save in the slot.
    pub fn new_game(config: GameConfig, backend: Box<dyn SaveBackend>, seed: u64) -> Self {
        let chart = StarChart::new(config.systems.clone());
        let state = GameState::new_game(&config, seed);
        log::info!(
            "store: new game, seed={seed}, {} systems, {} goods",
            chart.len(),
            config.goods.len()
        );
        Self {
            chart,
            backend,
            observers: ObserverRegistry::new(),
            rng: RngBank::new(seed),
            state,
            config,
        }
    }

    /// Load the slot if it holds a usable document, otherwise start a
    /// new game. Corrupt or version-incompatible saves are discarded —
    /// "no usable save" is a degraded outcome, not a failure.
    pub fn resume_or_new(
        config: GameConfig,
        backend: Box<dyn SaveBackend>,
        seed: u64,
    ) -> CoreResult<Self> {
        let payload = backend.read(SAVE_KEY)?;
        match payload.as_deref().map(migrate::decode) {
            Some(Ok(state)) => {
                let chart = StarChart::new(config.systems.clone());
                let master_seed = state.meta.seed;
                log::info!(
                    "store: resumed save at day {}, system {}",
                    state.player.days_elapsed,
                    state.player.current_system
                );
                Ok(Self {
                    chart,
                    backend,
                    observers: ObserverRegistry::new(),
                    rng: RngBank::new(master_seed),
                    state,
                    config,
                })
            }
            Some(Err(CoreError::CorruptSave(reason))) => {
                log::warn!("store: discarding corrupt save ({reason}); starting new game");
                Ok(Self::new_game(config, backend, seed))
            }
            Some(Err(CoreError::IncompatibleVersion { found })) => {
                log::warn!("store: save version '{found}' has no migration path; starting new game");
                Ok(Self::new_game(config, backend, seed))
            }
            Some(Err(other)) => Err(other),
            None => Ok(Self::new_game(config, backend, seed)),
        }
    }

    // ── Read surface ───────────────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn chart(&self) -> &StarChart {
        &self.chart
    }

    pub fn credits(&self) -> Credits {
        self.state.player.credits
    }

    pub fn current_day(&self) -> Day {
        self.state.player.days_elapsed
    }

    pub fn current_system(&self) -> SystemId {
        self.state.player.current_system
    }

    /// Live price of a good at the player's current location.
    pub fn current_price(&self, good: &str) -> CoreResult<Credits> {
        let good_cfg = self
            .config
            .goods
            .get(good)
            .ok_or_else(|| CoreError::UnknownGood(good.to_string()))?;
        let system = self.chart.require(self.state.player.current_system)?;
        Ok(pricing::calculate_price(
            good_cfg,
            system,
            self.state.player.days_elapsed,
            &self.state.world.active_events,
            &self.state.world.market_conditions,
        ))
    }

    // ── Subscriptions ──────────────────────────────────────────

    pub fn subscribe(
        &mut self,
        kind: ChangeKind,
        callback: Box<dyn FnMut(&ChangeEvent)>,
    ) -> SubscriberId {
        self.observers.subscribe(kind, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit(&mut self, event: ChangeEvent) {
        self.observers.notify(&event);
    }

    // ── Trading ────────────────────────────────────────────────

    /// Buy `quantity` of `good` at `unit_price`. Consolidates into the
    /// first existing stack with the same good and price; records
    /// negative trade pressure (goods bought out of the system).
    pub fn buy(&mut self, good: &str, quantity: u32, unit_price: Credits) -> TxResult<BuyReceipt> {
        if quantity == 0 {
            return Err(Rejection::InvalidQuantity { quantity });
        }
        // Prices out of the formula are always >= 1; a non-positive or
        // overflowing price would corrupt the credit balance.
        if unit_price <= 0 {
            return Err(Rejection::InvalidPrice { price: unit_price });
        }
        if !self.config.goods.contains_key(good) {
            return Err(Rejection::UnknownGood(good.to_string()));
        }
        let Some(cost) = Credits::from(quantity).checked_mul(unit_price) else {
            return Err(Rejection::InvalidPrice { price: unit_price });
        };
        if cost > self.state.player.credits {
            return Err(Rejection::InsufficientCredits {
                required: cost,
                available: self.state.player.credits,
            });
        }
        let remaining = self.state.ship.cargo_remaining();
        if quantity > remaining {
            return Err(Rejection::InsufficientCargoSpace {
                requested: quantity,
                available: remaining,
            });
        }

        let system_id = self.state.player.current_system;
        let stack_index = match self
            .state
            .ship
            .cargo
            .iter()
            .position(|s| s.good == good && s.buy_price == unit_price)
        {
            Some(index) => {
                self.state.ship.cargo[index].quantity += quantity;
                index
            }
            None => {
                let system_name = self
                    .chart
                    .get(system_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                self.state.ship.cargo.push(CargoStack {
                    good: good.to_string(),
                    quantity,
                    buy_price: unit_price,
                    buy_system: system_id,
                    buy_system_name: system_name,
                    buy_date: self.state.player.days_elapsed,
                });
                self.state.ship.cargo.len() - 1
            }
        };

        self.state.player.credits -= cost;
        market::apply_trade(
            &mut self.state.world.market_conditions,
            system_id,
            good,
            -f64::from(quantity),
        );

        log::info!(
            "day={} trade: bought {quantity} {good} @ {unit_price} ({cost} cr)",
            self.state.player.days_elapsed
        );
        self.emit(ChangeEvent::CreditsChanged(self.state.player.credits));
        self.emit(ChangeEvent::CargoChanged(self.state.ship.cargo.clone()));
        self.autosave();

        Ok(BuyReceipt { cost, stack_index })
    }

    /// Sell `quantity` out of the stack at `stack_index` for
    /// `unit_price` each. Removes the stack when it reaches zero;
    /// records positive trade pressure.
    pub fn sell(
        &mut self,
        stack_index: usize,
        quantity: u32,
        unit_price: Credits,
    ) -> TxResult<SellReceipt> {
        let Some(stack) = self.state.ship.cargo.get(stack_index) else {
            return Err(Rejection::InvalidStackIndex { index: stack_index });
        };
        if quantity == 0 || quantity > stack.quantity {
            return Err(Rejection::InvalidQuantity { quantity });
        }
        if unit_price <= 0 {
            return Err(Rejection::InvalidPrice { price: unit_price });
        }
        let Some(earned) = Credits::from(quantity).checked_mul(unit_price) else {
            return Err(Rejection::InvalidPrice { price: unit_price });
        };

        let good = stack.good.clone();
        let profit_margin = unit_price - stack.buy_price;

        let stack = &mut self.state.ship.cargo[stack_index];
        stack.quantity -= quantity;
        let stack_removed = stack.quantity == 0;
        if stack_removed {
            self.state.ship.cargo.remove(stack_index);
        }

        self.state.player.credits += earned;
        let system_id = self.state.player.current_system;
        market::apply_trade(
            &mut self.state.world.market_conditions,
            system_id,
            &good,
            f64::from(quantity),
        );

        log::info!(
            "day={} trade: sold {quantity} {good} @ {unit_price} (margin {profit_margin:+})",
            self.state.player.days_elapsed
        );
        self.emit(ChangeEvent::CreditsChanged(self.state.player.credits));
        self.emit(ChangeEvent::CargoChanged(self.state.ship.cargo.clone()));
        self.autosave();

        Ok(SellReceipt {
            earned,
            profit_margin,
            stack_removed,
        })
    }

    // ── Ship upkeep ────────────────────────────────────────────

    /// Fuel price per unit at the current system: a step function of
    /// distance from the origin, independent of the commodity formula.
    pub fn fuel_price_per_unit(&self) -> TxResult<Credits> {
        let system = self
            .chart
            .get(self.state.player.current_system)
            .ok_or(Rejection::UnknownSystem(self.state.player.current_system))?;
        let distance = system.distance_from_origin();
        let price = self
            .config
            .fuel_tiers
            .iter()
            .find(|t| distance <= t.max_distance)
            .or_else(|| self.config.fuel_tiers.last())
            .map(|t| t.price_per_unit)
            .unwrap_or(1);
        Ok(price)
    }

    pub fn refuel(&mut self, amount: f64) -> TxResult<RefuelReceipt> {
        if amount <= 0.0 {
            return Err(Rejection::InvalidAmount);
        }
        let current = self.state.ship.fuel;
        if current + amount > FUEL_CAPACITY + FUEL_EPSILON {
            return Err(Rejection::ExceedsFuelCapacity {
                current,
                requested: amount,
            });
        }
        let price_per_unit = self.fuel_price_per_unit()?;
        let cost = (amount * price_per_unit as f64).round() as Credits;
        if cost > self.state.player.credits {
            return Err(Rejection::InsufficientCredits {
                required: cost,
                available: self.state.player.credits,
            });
        }

        self.state.ship.fuel = (current + amount).min(FUEL_CAPACITY);
        self.state.player.credits -= cost;

        log::info!(
            "day={} ship: refueled {amount:.1} units for {cost} cr",
            self.state.player.days_elapsed
        );
        self.emit(ChangeEvent::FuelChanged(self.state.ship.fuel));
        self.emit(ChangeEvent::CreditsChanged(self.state.player.credits));
        self.autosave();

        Ok(RefuelReceipt {
            cost,
            new_fuel: self.state.ship.fuel,
        })
    }

    pub fn repair(&mut self, section: ShipSection, amount: f64) -> TxResult<RepairReceipt> {
        if amount <= 0.0 {
            return Err(Rejection::InvalidAmount);
        }
        let cost = (amount * self.config.repair_cost_per_percent as f64).round() as Credits;
        if cost > self.state.player.credits {
            return Err(Rejection::InsufficientCredits {
                required: cost,
                available: self.state.player.credits,
            });
        }

        let condition = match section {
            ShipSection::Hull => &mut self.state.ship.hull,
            ShipSection::Engine => &mut self.state.ship.engine,
            ShipSection::LifeSupport => &mut self.state.ship.life_support,
        };
        *condition = (*condition + amount).clamp(0.0, 100.0);
        let new_condition = *condition;
        self.state.player.credits -= cost;

        log::info!(
            "day={} ship: repaired {section:?} by {amount:.1} for {cost} cr",
            self.state.player.days_elapsed
        );
        self.emit(ChangeEvent::CreditsChanged(self.state.player.credits));
        self.autosave();

        Ok(RepairReceipt {
            cost,
            new_condition,
        })
    }

    /// Pay down debt from credits. Both floors at zero.
    pub fn pay_debt(&mut self, amount: Credits) -> TxResult<Credits> {
        if amount <= 0 {
            return Err(Rejection::InvalidAmount);
        }
        if amount > self.state.player.credits {
            return Err(Rejection::InsufficientCredits {
                required: amount,
                available: self.state.player.credits,
            });
        }
        let paid = amount.min(self.state.player.debt);
        self.state.player.credits -= paid;
        self.state.player.debt -= paid;

        log::info!(
            "day={} ledger: paid {paid} cr of debt, {} remaining",
            self.state.player.days_elapsed,
            self.state.player.debt
        );
        self.emit(ChangeEvent::CreditsChanged(self.state.player.credits));
        self.emit(ChangeEvent::DebtChanged(self.state.player.debt));
        self.autosave();

        Ok(paid)
    }

    // ── Hidden hold ────────────────────────────────────────────

    /// Move goods from the open hold into the hidden hold. The two
    /// holds never count against each other's capacity.
    pub fn stash_cargo(&mut self, stack_index: usize, quantity: u32) -> TxResult<()> {
        let Some(stack) = self.state.ship.cargo.get(stack_index) else {
            return Err(Rejection::InvalidStackIndex { index: stack_index });
        };
        if quantity == 0 || quantity > stack.quantity {
            return Err(Rejection::InvalidQuantity { quantity });
        }
        let hidden_remaining = self.state.ship.hidden_remaining();
        if quantity > hidden_remaining {
            return Err(Rejection::InsufficientHiddenSpace {
                requested: quantity,
                available: hidden_remaining,
            });
        }

        let moved = split_stack(&mut self.state.ship.cargo, stack_index, quantity);
        merge_stack(&mut self.state.ship.hidden_cargo, moved);
        self.emit(ChangeEvent::CargoChanged(self.state.ship.cargo.clone()));
        Ok(())
    }

    /// Move goods from the hidden hold back into the open hold.
    pub fn unstash_cargo(&mut self, hidden_index: usize, quantity: u32) -> TxResult<()> {
        let Some(stack) = self.state.ship.hidden_cargo.get(hidden_index) else {
            return Err(Rejection::InvalidStackIndex { index: hidden_index });
        };
        if quantity == 0 || quantity > stack.quantity {
            return Err(Rejection::InvalidQuantity { quantity });
        }
        let remaining = self.state.ship.cargo_remaining();
        if quantity > remaining {
            return Err(Rejection::InsufficientCargoSpace {
                requested: quantity,
                available: remaining,
            });
        }

        let moved = split_stack(&mut self.state.ship.hidden_cargo, hidden_index, quantity);
        merge_stack(&mut self.state.ship.cargo, moved);
        self.emit(ChangeEvent::CargoChanged(self.state.ship.cargo.clone()));
        Ok(())
    }

    // ── Location and time ──────────────────────────────────────

    /// Snapshot the current system's prices into price knowledge with
    /// zero staleness, and mark the system visited.
    pub fn dock(&mut self) -> TxResult<()> {
        let system_id = self.state.player.current_system;
        let prices = self
            .snapshot_prices(system_id)
            .map_err(|_| Rejection::UnknownSystem(system_id))?;
        self.state.world.visited_systems.insert(system_id);
        self.state.world.price_knowledge.insert(
            system_id,
            PriceKnowledge {
                last_visit: 0,
                prices,
            },
        );

        log::debug!("day={} dock: at system {system_id}", self.state.player.days_elapsed);
        self.emit(ChangeEvent::PriceKnowledgeChanged(
            self.state.world.price_knowledge.clone(),
        ));
        self.autosave();
        Ok(())
    }

    /// Presentation hook only; the document does not change.
    pub fn undock(&mut self) {
        log::debug!(
            "day={} dock: departing system {}",
            self.state.player.days_elapsed,
            self.state.player.current_system
        );
    }

    /// Advance the world to `new_day`. Staleness bumps, event
    /// expiry-then-spawn, pressure decay, and a full reprice of every
    /// known system all happen before the day counter moves.
    pub fn advance_time(&mut self, new_day: Day) -> TxResult<()> {
        let old_day = self.state.player.days_elapsed;
        if new_day <= old_day {
            return Err(Rejection::TimeNotForward {
                current: old_day,
                requested: new_day,
            });
        }
        let elapsed = new_day - old_day;

        for knowledge in self.state.world.price_knowledge.values_mut() {
            knowledge.last_visit += elapsed;
        }

        // Expire then spawn, so the new day's prices already reflect
        // event changes.
        let events = std::mem::take(&mut self.state.world.active_events);
        let mut events = economic_event::remove_expired(events, new_day);
        let goods: Vec<GoodId> = self.config.goods.keys().cloned().collect();
        let system_ids: Vec<SystemId> = self.chart.iter().map(|s| s.id).collect();
        let mut rng = self.rng.for_day(StreamSlot::EventSpawn, new_day);
        economic_event::maybe_spawn(
            &self.config.event,
            &goods,
            &system_ids,
            new_day,
            &mut events,
            &mut rng,
        );
        self.state.world.active_events = events;

        market::decay(&mut self.state.world.market_conditions, elapsed);

        self.state.player.days_elapsed = new_day;
        let known: Vec<SystemId> = self.state.world.price_knowledge.keys().copied().collect();
        for system_id in known {
            if let Ok(prices) = self.snapshot_prices(system_id) {
                if let Some(knowledge) = self.state.world.price_knowledge.get_mut(&system_id) {
                    knowledge.prices = prices;
                }
            }
        }

        log::debug!("time: advanced day {old_day} -> {new_day}");
        self.emit(ChangeEvent::TimeChanged(new_day));
        self.emit(ChangeEvent::ActiveEventsChanged(
            self.state.world.active_events.clone(),
        ));
        self.emit(ChangeEvent::PriceKnowledgeChanged(
            self.state.world.price_knowledge.clone(),
        ));
        Ok(())
    }

    /// Settle a jump: fuel, location, transit time, and the arrival
    /// dock all commit synchronously (and durably) here. Whatever
    /// transition animation the presentation layer plays afterwards
    /// can fail without losing progress.
    pub fn settle_jump(&mut self, destination: SystemId, nav: &dyn Navigator) -> TxResult<JumpReceipt> {
        let origin_id = self.state.player.current_system;
        if destination == origin_id {
            return Err(Rejection::AlreadyThere(destination));
        }
        let Some(dest) = self.chart.get(destination) else {
            return Err(Rejection::UnknownSystem(destination));
        };
        let Some(origin) = self.chart.get(origin_id) else {
            return Err(Rejection::UnknownSystem(origin_id));
        };

        let distance = nav.distance(origin, dest);
        let fuel_cost = nav.jump_fuel_cost(distance, self.state.ship.engine);
        if fuel_cost > self.state.ship.fuel + FUEL_EPSILON {
            return Err(Rejection::InsufficientFuel {
                required: fuel_cost,
                available: self.state.ship.fuel,
            });
        }
        let days = nav.jump_time_days(distance, self.state.ship.engine);

        self.state.ship.fuel = (self.state.ship.fuel - fuel_cost).max(0.0);
        self.state.player.current_system = destination;
        self.state.world.visited_systems.insert(destination);

        log::info!(
            "day={} jump: {origin_id} -> {destination}, {distance:.1} units, {fuel_cost:.1} fuel, {days}d transit",
            self.state.player.days_elapsed
        );
        self.emit(ChangeEvent::FuelChanged(self.state.ship.fuel));
        self.emit(ChangeEvent::LocationChanged(destination));

        if days > 0 {
            let arrival = self.state.player.days_elapsed + days;
            // Cannot fail: arrival is strictly ahead of the clock.
            let _ = self.advance_time(arrival);
        }
        self.dock()?;

        // A jump is not recoverable from the presentation side, so the
        // settlement bypasses the debounce window.
        if let Err(e) = self.persist(true) {
            log::warn!("jump: settlement persisted state write failed: {e}");
        }

        Ok(JumpReceipt {
            distance,
            fuel_spent: fuel_cost,
            days_in_transit: days,
        })
    }

    /// Purchased intelligence: pay to snapshot a remote system's
    /// current prices without flying there.
    pub fn buy_price_intel(&mut self, system_id: SystemId, cost: Credits) -> TxResult<()> {
        if cost < 0 {
            return Err(Rejection::InvalidAmount);
        }
        if cost > self.state.player.credits {
            return Err(Rejection::InsufficientCredits {
                required: cost,
                available: self.state.player.credits,
            });
        }
        let prices = self
            .snapshot_prices(system_id)
            .map_err(|_| Rejection::UnknownSystem(system_id))?;

        self.state.player.credits -= cost;
        self.state.world.price_knowledge.insert(
            system_id,
            PriceKnowledge {
                last_visit: 0,
                prices,
            },
        );

        log::info!(
            "day={} intel: bought price data for system {system_id} ({cost} cr)",
            self.state.player.days_elapsed
        );
        self.emit(ChangeEvent::CreditsChanged(self.state.player.credits));
        self.emit(ChangeEvent::PriceKnowledgeChanged(
            self.state.world.price_knowledge.clone(),
        ));
        self.autosave();
        Ok(())
    }

    // ── Dialogue collaborator surface ──────────────────────────
    //
    // Reputation values and story flags only — never dialogue text.

    pub fn modify_rep(&mut self, npc_id: &str, raw_delta: i32, reason: &str) -> TxResult<RepChange> {
        let Some(npc_config) = self.config.npcs.get(npc_id) else {
            return Err(Rejection::UnknownNpc(npc_id.to_string()));
        };
        let trust = npc_config.trust;
        let quirk_modifiers: Vec<f64> = self
            .state
            .ship
            .quirks
            .iter()
            .filter_map(|q| self.config.quirk_rep_modifiers.get(q))
            .copied()
            .collect();

        let day = self.state.player.days_elapsed;
        let npc = self
            .state
            .npcs
            .entry(npc_id.to_string())
            .or_default();
        let change = reputation::modify_rep(npc, raw_delta, trust, &quirk_modifiers, day);
        reputation::log_change(&npc_id.to_string(), reason, &change, day);
        Ok(change)
    }

    /// Append a story flag before the associated dialogue node's text
    /// is returned to the caller. Returns true if newly added.
    pub fn add_story_flag(&mut self, npc_id: &str, flag: &str) -> TxResult<bool> {
        if !self.config.npcs.contains_key(npc_id) {
            return Err(Rejection::UnknownNpc(npc_id.to_string()));
        }
        let npc = self
            .state
            .npcs
            .entry(npc_id.to_string())
            .or_default();
        Ok(reputation::add_flag(npc, flag))
    }

    pub fn npc_state(&self, npc_id: &str) -> Option<&NpcState> {
        self.state.npcs.get(npc_id)
    }

    pub fn rep_tier(&self, npc_id: &str) -> Option<RepTier> {
        self.state.npcs.get(npc_id).map(|n| RepTier::from_score(n.rep))
    }

    // ── Persistence ────────────────────────────────────────────

    /// Write the slot now. `force` bypasses the debounce window for
    /// callers that need durability before a non-recoverable action.
    pub fn save_now(&mut self, force: bool) -> CoreResult<WriteOutcome> {
        self.persist(force)
    }

    /// Delete the save slot. The live document keeps running; there is
    /// no terminal state.
    pub fn clear_slot(&mut self) -> CoreResult<()> {
        self.backend.delete(SAVE_KEY)?;
        self.state.meta.last_write = None;
        log::info!("store: save slot cleared");
        Ok(())
    }

    fn persist(&mut self, force: bool) -> CoreResult<WriteOutcome> {
        let now = Utc::now();
        if !force {
            if let Some(last) = self.state.meta.last_write {
                let window = chrono::Duration::milliseconds(self.config.debounce_window_ms);
                if now - last < window {
                    log::debug!("store: write debounced");
                    return Ok(WriteOutcome::DebouncedSkip);
                }
            }
        }

        let previous = self.state.meta.last_write.replace(now);
        let payload = serde_json::to_string(&self.state)?;
        if let Err(e) = self.backend.write(SAVE_KEY, &payload) {
            self.state.meta.last_write = previous;
            return Err(e);
        }
        Ok(WriteOutcome::Written)
    }

    fn autosave(&mut self) {
        if let Err(e) = self.persist(false) {
            log::warn!("store: best-effort save failed: {e}");
        }
    }

    fn snapshot_prices(&self, system_id: SystemId) -> CoreResult<BTreeMap<GoodId, Credits>> {
        let system = self.chart.require(system_id)?;
        Ok(self
            .config
            .goods
            .values()
            .map(|good| {
                let price = pricing::calculate_price(
                    good,
                    system,
                    self.state.player.days_elapsed,
                    &self.state.world.active_events,
                    &self.state.world.market_conditions,
                );
                (good.good_id.clone(), price)
            })
            .collect())
    }
}

/// Take `quantity` out of the stack at `index`, removing the stack if
/// it is emptied. Returns a stack carrying the moved lot.
fn split_stack(stacks: &mut Vec<CargoStack>, index: usize, quantity: u32) -> CargoStack {
    let stack = &mut stacks[index];
    let mut moved = stack.clone();
    moved.quantity = quantity;
    stack.quantity -= quantity;
    if stack.quantity == 0 {
        stacks.remove(index);
    }
    moved
}

/// Merge a lot into the first stack with the same good and buy price,
/// or append it.
fn merge_stack(stacks: &mut Vec<CargoStack>, lot: CargoStack) {
    match stacks
        .iter_mut()
        .find(|s| s.good == lot.good && s.buy_price == lot.buy_price)
    {
        Some(existing) => existing.quantity += lot.quantity,
        None => stacks.push(lot),
    }
}
