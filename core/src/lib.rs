//! Tradewinds core — persistent game-state store and deterministic
//! economic simulation.
//!
//! The store (store.rs) owns the single mutable game-state document
//! and runs every mutation; the pricing, market, event, and reputation
//! components are pure over the slices they are handed. Persistence is
//! a key-value boundary with one fixed slot key, versioned schema
//! migration, and debounced best-effort writes.
//!
//! Rendering, UI, dialogue text, and jump geometry live outside this
//! crate; they reach the core only through the change-notification,
//! dialogue, and Navigator boundaries.

pub mod config;
pub mod economic_event;
pub mod error;
pub mod galaxy;
pub mod market;
pub mod migrate;
pub mod observer;
pub mod pricing;
pub mod reputation;
pub mod rng;
pub mod save;
pub mod state;
pub mod store;
pub mod types;
