//! Save-document schema migration.
//!
//! Versions "1.0.0", "2.0.0", and "2.1.0" (current) are all
//! load-compatible. Each transition is a pure function on the JSON
//! tree, applied in sequence before the typed decode — business logic
//! never sees a missing field. Unknown versions have no migration path
//! and are treated like corrupt data by the caller.
//!
//! Backfill defaults:
//!   v1 -> v2:   ship condition 100, empty quirks/upgrades, empty
//!               hidden cargo (capacity 0)
//!   v2 -> v2.1: empty price knowledge / active events / market
//!               conditions, meta.game_id and meta.seed

use crate::{
    error::{CoreError, CoreResult},
    state::{GameState, SCHEMA_VERSION},
};
use serde_json::{json, Value};

/// Parse, upgrade in place, and decode a persisted document.
pub fn decode(payload: &str) -> CoreResult<GameState> {
    let doc: Value = serde_json::from_str(payload)
        .map_err(|e| CoreError::CorruptSave(format!("not valid JSON: {e}")))?;
    let upgraded = upgrade_to_current(doc)?;
    serde_json::from_value(upgraded)
        .map_err(|e| CoreError::CorruptSave(format!("schema mismatch after migration: {e}")))
}

/// Walk the migration chain until the document reports the current
/// version.
pub fn upgrade_to_current(mut doc: Value) -> CoreResult<Value> {
    loop {
        let version = doc
            .pointer("/meta/version")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::CorruptSave("missing meta.version".into()))?
            .to_string();

        match version.as_str() {
            "1.0.0" => {
                log::info!("migrate: upgrading save 1.0.0 -> 2.0.0");
                doc = v1_to_v2(doc)?;
            }
            "2.0.0" => {
                log::info!("migrate: upgrading save 2.0.0 -> 2.1.0");
                doc = v2_to_v2_1(doc)?;
            }
            SCHEMA_VERSION => return Ok(doc),
            other => {
                return Err(CoreError::IncompatibleVersion {
                    found: other.to_string(),
                })
            }
        }
    }
}

fn object_mut<'a>(doc: &'a mut Value, pointer: &str) -> CoreResult<&'a mut serde_json::Map<String, Value>> {
    doc.pointer_mut(pointer)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| CoreError::CorruptSave(format!("missing object at {pointer}")))
}

fn fill(map: &mut serde_json::Map<String, Value>, key: &str, default: Value) {
    map.entry(key.to_string()).or_insert(default);
}

/// 1.0.0 -> 2.0.0: the ship gained condition, quirks, upgrades, and a
/// hidden hold.
fn v1_to_v2(mut doc: Value) -> CoreResult<Value> {
    let ship = object_mut(&mut doc, "/ship")?;
    fill(ship, "hull", json!(100.0));
    fill(ship, "engine", json!(100.0));
    fill(ship, "life_support", json!(100.0));
    fill(ship, "quirks", json!([]));
    fill(ship, "upgrades", json!([]));
    fill(ship, "hidden_cargo", json!([]));
    fill(ship, "hidden_cargo_capacity", json!(0));

    let meta = object_mut(&mut doc, "/meta")?;
    meta.insert("version".into(), json!("2.0.0"));
    Ok(doc)
}

/// 2.0.0 -> 2.1.0: the world gained the price/event/pressure maps and
/// meta gained identity fields. Empty maps are correct defaults — the
/// next dock/advance repopulates them.
fn v2_to_v2_1(mut doc: Value) -> CoreResult<Value> {
    let world = object_mut(&mut doc, "/world")?;
    fill(world, "price_knowledge", json!({}));
    fill(world, "active_events", json!([]));
    fill(world, "market_conditions", json!({}));

    let meta = object_mut(&mut doc, "/meta")?;
    fill(meta, "game_id", json!(uuid::Uuid::new_v4().to_string()));
    fill(meta, "seed", json!(0u64));
    fill(meta, "last_write", Value::Null);
    meta.insert("version".into(), json!(SCHEMA_VERSION));
    Ok(doc)
}
