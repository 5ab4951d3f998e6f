use crate::types::SystemId;
use thiserror::Error;

/// Failures that can surface from the core.
///
/// Player-facing validation failures (insufficient funds, bad stack
/// index, over-capacity refuel) are NOT represented here — those are
/// `Rejection` values returned by the store's transaction methods and
/// always leave state untouched.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt saved document: {0}")]
    CorruptSave(String),

    #[error("Incompatible save version '{found}' (no migration path)")]
    IncompatibleVersion { found: String },

    #[error("Unknown star system: {0}")]
    UnknownSystem(SystemId),

    #[error("Unknown good: {0}")]
    UnknownGood(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
