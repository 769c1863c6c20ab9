pub mod api;
pub mod character;
pub mod content;
pub mod derived;
pub mod diff;
pub mod discipline;
pub mod error;
pub mod ids;
pub mod roster;
pub mod session;
pub mod track;
pub mod traits;
pub mod transfer;

pub use character::{
    ChangeLogEntry, Character, Essence, Ghoul, Kind, Mage, Resonance, Sheet, Vampire, Variant,
};
pub use derived::{recalculate, Recalculated};
pub use diff::{diff, summarize};
pub use discipline::{Discipline, Disciplines, Power, Toggle};
pub use error::{EngineError, Result, StoreError};
pub use ids::{BackgroundId, CharacterId, DisciplineId, EntryId, PowerId};
pub use roster::{JsonFileStore, MemoryStore, Persistence, Roster};
pub use session::{begin_edit, EditSession};
pub use track::{DamageKind, DamageState, DamageTrack, MarkState, MarkTrack, Track};
pub use traits::{Advantage, Background, Ratings, Specialization};

/// Every discipline `character` could pick from: catalog entries it does
/// not own yet, then its own custom ones.
pub fn available_disciplines(character: &Character) -> Result<Vec<Discipline>> {
    let owned = character
        .disciplines()
        .ok_or_else(|| EngineError::wrong_variant(Kind::Vampire, character.kind()))?;
    Ok(owned.available(&content::standard_disciplines()?))
}
