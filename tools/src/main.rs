//! trade-runner: headless session runner for the Tradewinds core.
//!
//! Plays a scripted trade circuit with no UI attached: dock, buy the
//! best local margin, jump along the catalog, sell what turned a
//! profit, repeat. Useful for smoke-running the economy and the save
//! path end to end.
//!
//! Usage:
//!   trade-runner --seed 12345 --circuits 10 --db save.db
//!   trade-runner --seed 12345 --data-dir ./data

use anyhow::Result;
use std::env;
use tradewinds_core::{
    config::GameConfig,
    galaxy::{Navigator, StarSystem},
    save::{MemorySaveStore, SaveBackend, SqliteSaveStore},
    store::{GameStateStore, Rejection},
    types::SystemId,
};

/// Straight-line navigation with engine-degraded fuel burn. Stands in
/// for the game's navigation subsystem.
struct StandardNavigator;

impl Navigator for StandardNavigator {
    fn distance(&self, a: &StarSystem, b: &StarSystem) -> f64 {
        let dx = a.coords[0] - b.coords[0];
        let dy = a.coords[1] - b.coords[1];
        let dz = a.coords[2] - b.coords[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    fn jump_fuel_cost(&self, distance: f64, engine_condition: f64) -> f64 {
        let degradation = 1.0 + (100.0 - engine_condition.clamp(0.0, 100.0)) / 100.0;
        distance * 2.0 * degradation
    }

    fn jump_time_days(&self, distance: f64, _engine_condition: f64) -> u64 {
        (distance / 4.0).ceil().max(1.0) as u64
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let circuits = parse_arg(&args, "--circuits", 10u64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str());

    println!("Tradewinds — trade-runner");
    println!("  seed:     {seed}");
    println!("  circuits: {circuits}");
    println!("  db:       {db}");
    println!();

    let config = match data_dir {
        Some(dir) => GameConfig::load(dir)?,
        None => GameConfig::default_test(),
    };
    let backend: Box<dyn SaveBackend> = if db == ":memory:" {
        Box::new(MemorySaveStore::new())
    } else {
        Box::new(SqliteSaveStore::open(db)?)
    };

    let mut store = GameStateStore::resume_or_new(config, backend, seed)?;
    let nav = StandardNavigator;
    let route: Vec<SystemId> = store.chart().iter().map(|s| s.id).collect();

    store.dock().map_err(reject)?;
    for circuit in 0..circuits {
        for &stop in &route {
            if stop == store.current_system() {
                continue;
            }
            sell_profitable(&mut store);
            buy_best_margin(&mut store);
            top_up_fuel(&mut store);
            match store.settle_jump(stop, &nav) {
                Ok(receipt) => log::info!(
                    "circuit {circuit}: jumped to {stop} ({:.1} units, {}d)",
                    receipt.distance,
                    receipt.days_in_transit
                ),
                Err(r) => log::warn!("circuit {circuit}: jump to {stop} rejected: {r}"),
            }
        }
    }
    sell_profitable(&mut store);
    store.save_now(true)?;

    print_summary(&store, seed);
    Ok(())
}

/// Sell every stack whose live local price beats its buy price.
fn sell_profitable(store: &mut GameStateStore) {
    loop {
        let candidate = store.state().ship.cargo.iter().enumerate().find_map(|(i, s)| {
            let price = store.current_price(&s.good).ok()?;
            (price > s.buy_price).then_some((i, s.quantity, price))
        });
        let Some((index, quantity, price)) = candidate else {
            break;
        };
        match store.sell(index, quantity, price) {
            Ok(receipt) => log::info!(
                "sold stack {index} for {} cr (margin {:+}/unit)",
                receipt.earned,
                receipt.profit_margin
            ),
            Err(r) => {
                log::warn!("sell rejected: {r}");
                break;
            }
        }
    }
}

/// Spend up to half the purse on the locally cheapest good relative to
/// its base price.
fn buy_best_margin(store: &mut GameStateStore) {
    let budget = store.credits() / 2;
    if budget <= 0 {
        return;
    }
    let Some((good, price)) = store
        .state()
        .world
        .price_knowledge
        .get(&store.current_system())
        .map(|k| k.prices.clone())
        .unwrap_or_default()
        .into_iter()
        .min_by_key(|(_, price)| *price)
    else {
        return;
    };
    let space = store.state().ship.cargo_remaining() as i64;
    let quantity = (budget / price.max(1)).min(space);
    if quantity <= 0 {
        return;
    }
    if let Err(r) = store.buy(&good, quantity as u32, price) {
        log::warn!("buy rejected: {r}");
    }
}

fn top_up_fuel(store: &mut GameStateStore) {
    let missing = 100.0 - store.state().ship.fuel;
    if missing < 1.0 {
        return;
    }
    if let Err(r) = store.refuel(missing) {
        log::debug!("refuel skipped: {r}");
    }
}

fn print_summary(store: &GameStateStore, seed: u64) {
    let state = store.state();
    println!();
    println!("=== session summary (seed {seed}) ===");
    println!("  day:            {}", state.player.days_elapsed);
    println!("  credits:        {}", state.player.credits);
    println!("  debt:           {}", state.player.debt);
    println!("  fuel:           {:.1}", state.ship.fuel);
    println!("  cargo stacks:   {}", state.ship.cargo.len());
    println!("  visited:        {}", state.world.visited_systems.len());
    println!("  active events:  {}", state.world.active_events.len());
    println!("  known markets:  {}", state.world.price_knowledge.len());
}

fn reject(r: Rejection) -> anyhow::Error {
    anyhow::anyhow!("rejected: {r}")
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
