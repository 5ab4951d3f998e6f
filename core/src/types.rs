//! Shared primitive types used across the entire core.

/// One in-game day. Day 0 is the start of a new game.
pub type Day = u64;

/// Numeric star-system identifier from the static star catalog.
pub type SystemId = u32;

/// Stable commodity identifier (e.g. "grain", "isotopes").
pub type GoodId = String;

/// Stable NPC identifier.
pub type NpcId = String;

/// Whole-credit currency amount. Commodity prices are always integral.
pub type Credits = i64;
