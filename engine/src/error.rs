use thiserror::Error;

use crate::character::Kind;

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Precondition violations surfaced by the engine.
///
/// Missing optional data never ends up here: decoding fills defaults and
/// no-op requests (removing an unknown discipline, re-adding a custom one)
/// simply return.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("power {power_id} is not offered by {discipline} at level {level}")]
    UnknownPower {
        discipline: String,
        level: u8,
        power_id: String,
    },

    #[error("character has no discipline named '{0}'")]
    UnknownDiscipline(String),

    #[error("unknown trait '{0}'")]
    UnknownTrait(String),

    #[error("rating {value} for '{name}' is outside 0..=5")]
    RatingOutOfRange { name: String, value: i32 },

    #[error("expected a {expected} character, found {found}")]
    WrongVariant { expected: Kind, found: Kind },

    #[error("box {index} is outside a track of {len} boxes")]
    BoxOutOfRange { index: usize, len: usize },

    #[error("no character with id {0}")]
    UnknownCharacter(String),

    #[error("index {index} is outside a roster of {len} characters")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("could not decode payload: {0}")]
    Decode(String),

    #[error("could not encode payload: {0}")]
    Encode(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn wrong_variant(expected: Kind, found: Kind) -> Self {
        Self::WrongVariant { expected, found }
    }
}

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store payload is not a roster: {0}")]
    Format(#[from] serde_json::Error),
}
