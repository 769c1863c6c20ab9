//! The ordered collection of characters, persisted through an injected port.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::character::Character;
use crate::error::{EngineError, Result, StoreError};
use crate::ids::CharacterId;

pub const ARCHIVED_NOTE: &str = "Character moved to archive.";
pub const UNARCHIVED_NOTE: &str = "Character returned from archive";

/// Where the roster lives between runs. Implementations serialize the
/// whole list on every save.
pub trait Persistence {
    fn load(&self) -> Result<Vec<Character>, StoreError>;
    fn save(&mut self, characters: &[Character]) -> Result<(), StoreError>;
}

impl<P: Persistence + ?Sized> Persistence for Box<P> {
    fn load(&self) -> Result<Vec<Character>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, characters: &[Character]) -> Result<(), StoreError> {
        (**self).save(characters)
    }
}

/// JSON blob held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blob: Option<Vec<u8>>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Some(blob.into()),
            saves: 0,
        }
    }

    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }

    /// Number of completed saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> Result<Vec<Character>, StoreError> {
        match &self.blob {
            Some(bytes) => Ok(serde_json::from_slice(bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, characters: &[Character]) -> Result<(), StoreError> {
        self.blob = Some(serde_json::to_vec(characters)?);
        self.saves += 1;
        Ok(())
    }
}

/// JSON blob on disk. A missing file reads as an empty roster; writes go to
/// a sibling temp file that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFileStore {
    fn load(&self) -> Result<Vec<Character>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&mut self, characters: &[Character]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(characters)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Ordered characters plus the port they are saved through.
pub struct Roster<P: Persistence> {
    characters: Vec<Character>,
    store: P,
}

impl<P: Persistence> Roster<P> {
    pub fn open(store: P) -> Result<Self> {
        let characters = store.load()?;
        info!(count = characters.len(), "roster loaded");
        Ok(Self { characters, store })
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn active(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| !c.sheet.archived)
    }

    pub fn archived(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.sheet.archived)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id() == id)
    }

    pub fn position(&self, id: CharacterId) -> Option<usize> {
        self.characters.iter().position(|c| c.id() == id)
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn add(&mut self, character: Character) -> Result<CharacterId> {
        let id = character.id();
        info!(%id, name = character.name(), kind = %character.kind(), "adding character");
        let mut next = self.characters.clone();
        next.push(character);
        self.persist(next)?;
        Ok(id)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Character> {
        let len = self.characters.len();
        if index >= len {
            return Err(EngineError::IndexOutOfRange { index, len });
        }
        let mut next = self.characters.clone();
        let removed = next.remove(index);
        self.persist(next)?;
        info!(id = %removed.id(), "removed character");
        Ok(removed)
    }

    /// Replace the stored character with the same id.
    pub fn update(&mut self, character: Character) -> Result<()> {
        let index = self
            .position(character.id())
            .ok_or_else(|| EngineError::UnknownCharacter(character.id().to_string()))?;
        let mut next = self.characters.clone();
        next[index] = character;
        self.persist(next)
    }

    /// Replace by id, or append a character not seen before.
    pub fn import(&mut self, character: Character) -> Result<CharacterId> {
        let id = character.id();
        let mut next = self.characters.clone();
        match self.position(id) {
            Some(index) => next[index] = character,
            None => next.push(character),
        }
        self.persist(next)?;
        info!(%id, "imported character");
        Ok(id)
    }

    pub fn archive(&mut self, id: CharacterId) -> Result<()> {
        self.set_archived(id, true, ARCHIVED_NOTE)
    }

    pub fn unarchive(&mut self, id: CharacterId) -> Result<()> {
        self.set_archived(id, false, UNARCHIVED_NOTE)
    }

    fn set_archived(&mut self, id: CharacterId, archived: bool, note: &str) -> Result<()> {
        let index = self
            .position(id)
            .ok_or_else(|| EngineError::UnknownCharacter(id.to_string()))?;
        let mut next = self.characters.clone();
        next[index].sheet.archived = archived;
        next[index].log(note);
        self.persist(next)?;
        info!(%id, archived, "archive flag changed");
        Ok(())
    }

    /// Save `next` through the port. The roster only adopts it once the save succeeds.
    fn persist(&mut self, next: Vec<Character>) -> Result<()> {
        self.store.save(&next)?;
        self.characters = next;
        Ok(())
    }
}
