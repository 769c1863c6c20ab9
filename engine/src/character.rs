use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::derived::{recalculate, Recalculated};
use crate::discipline::{Discipline, Disciplines, Power, Toggle};
use crate::error::{EngineError, Result};
use crate::ids::{CharacterId, EntryId, PowerId};
use crate::track::{DamageTrack, MarkTrack};
use crate::traits::{
    Advantage, Background, Ratings, Specialization, ATTRIBUTE_DEFAULT, MENTAL_ATTRIBUTES,
    MENTAL_SKILLS, PHYSICAL_ATTRIBUTES, PHYSICAL_SKILLS, SOCIAL_ATTRIBUTES, SOCIAL_SKILLS, SPHERES,
};

pub const HUMANITY_BOXES: usize = 10;
pub const MAGE_TRAIT_BOXES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Vampire,
    Ghoul,
    Mage,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Vampire => "Vampire",
            Kind::Ghoul => "Ghoul",
            Kind::Mage => "Mage",
        })
    }
}

impl std::str::FromStr for Kind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "vampire" => Ok(Kind::Vampire),
            "ghoul" => Ok(Kind::Ghoul),
            "mage" => Ok(Kind::Mage),
            other => Err(EngineError::Decode(format!("unknown character type '{other}'"))),
        }
    }
}

/// Append-only change log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    #[serde(default)]
    pub id: EntryId,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub summary: String,
}

impl ChangeLogEntry {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            timestamp: Utc::now(),
            summary: summary.into(),
        }
    }
}

/// Fields every character type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sheet {
    pub id: CharacterId,
    pub name: String,

    pub physical_attributes: Ratings,
    pub social_attributes: Ratings,
    pub mental_attributes: Ratings,
    pub physical_skills: Ratings,
    pub social_skills: Ratings,
    pub mental_skills: Ratings,

    pub health: i32,
    pub health_track: DamageTrack,
    pub willpower: i32,
    pub willpower_track: DamageTrack,

    pub experience: i32,
    pub spent_experience: i32,

    pub ambition: String,
    pub desire: String,
    pub chronicle: String,
    pub concept: String,
    pub description: String,
    pub notes: String,
    pub birth_date: Option<NaiveDate>,

    pub advantages: Vec<Advantage>,
    pub flaws: Vec<Advantage>,
    pub background_merits: Vec<Background>,
    pub background_flaws: Vec<Background>,
    pub convictions: Vec<String>,
    pub touchstones: Vec<String>,
    pub specializations: Vec<Specialization>,

    pub session_count: i32,
    pub change_log: Vec<ChangeLogEntry>,
    pub archived: bool,
}

impl Default for Sheet {
    fn default() -> Self {
        Self {
            id: CharacterId::new(),
            name: String::new(),
            physical_attributes: Ratings::with_keys(&PHYSICAL_ATTRIBUTES, ATTRIBUTE_DEFAULT),
            social_attributes: Ratings::with_keys(&SOCIAL_ATTRIBUTES, ATTRIBUTE_DEFAULT),
            mental_attributes: Ratings::with_keys(&MENTAL_ATTRIBUTES, ATTRIBUTE_DEFAULT),
            physical_skills: Ratings::with_keys(&PHYSICAL_SKILLS, 0),
            social_skills: Ratings::with_keys(&SOCIAL_SKILLS, 0),
            mental_skills: Ratings::with_keys(&MENTAL_SKILLS, 0),
            health: 0,
            health_track: DamageTrack::default(),
            willpower: 0,
            willpower_track: DamageTrack::default(),
            experience: 0,
            spent_experience: 0,
            ambition: String::new(),
            desire: String::new(),
            chronicle: String::new(),
            concept: String::new(),
            description: String::new(),
            notes: String::new(),
            birth_date: None,
            advantages: Vec::new(),
            flaws: Vec::new(),
            background_merits: Vec::new(),
            background_flaws: Vec::new(),
            convictions: Vec::new(),
            touchstones: Vec::new(),
            specializations: Vec::new(),
            session_count: 0,
            change_log: Vec::new(),
            archived: false,
        }
    }
}

impl Sheet {
    pub fn attribute(&self, name: &str) -> i32 {
        self.attribute_maps()
            .into_iter()
            .find_map(|m| m.get(name))
            .unwrap_or(ATTRIBUTE_DEFAULT)
    }

    pub fn skill(&self, name: &str) -> i32 {
        self.skill_maps()
            .into_iter()
            .find_map(|m| m.get(name))
            .unwrap_or(0)
    }

    pub fn attribute_maps(&self) -> [&Ratings; 3] {
        [
            &self.physical_attributes,
            &self.social_attributes,
            &self.mental_attributes,
        ]
    }

    pub fn skill_maps(&self) -> [&Ratings; 3] {
        [&self.physical_skills, &self.social_skills, &self.mental_skills]
    }

    pub fn available_experience(&self) -> i32 {
        self.experience - self.spent_experience
    }

    /// Every attribute and skill rating is within 0..=5.
    pub fn validate(&self) -> Result<()> {
        for map in self.attribute_maps().into_iter().chain(self.skill_maps()) {
            map.validate()?;
        }
        Ok(())
    }

    /// Restore keys an older payload may have omitted.
    fn fill_missing(&mut self) {
        self.physical_attributes
            .fill_missing(&PHYSICAL_ATTRIBUTES, ATTRIBUTE_DEFAULT);
        self.social_attributes
            .fill_missing(&SOCIAL_ATTRIBUTES, ATTRIBUTE_DEFAULT);
        self.mental_attributes
            .fill_missing(&MENTAL_ATTRIBUTES, ATTRIBUTE_DEFAULT);
        self.physical_skills.fill_missing(&PHYSICAL_SKILLS, 0);
        self.social_skills.fill_missing(&SOCIAL_SKILLS, 0);
        self.mental_skills.fill_missing(&MENTAL_SKILLS, 0);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vampire {
    pub clan: String,
    pub generation: i32,
    pub blood_potency: i32,
    pub hunger: i32,
    pub predator_type: String,
    pub custom_predator_types: Vec<String>,
    pub humanity: i32,
    pub humanity_track: MarkTrack,
    pub embrace_date: Option<NaiveDate>,
    pub disciplines: Disciplines,
}

impl Default for Vampire {
    fn default() -> Self {
        Self {
            clan: String::new(),
            generation: 13,
            blood_potency: 1,
            hunger: 1,
            predator_type: String::new(),
            custom_predator_types: Vec::new(),
            humanity: 7,
            humanity_track: MarkTrack::new(HUMANITY_BOXES),
            embrace_date: None,
            disciplines: Disciplines::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ghoul {
    pub humanity: i32,
    pub humanity_track: MarkTrack,
    pub ghouling_date: Option<NaiveDate>,
    pub disciplines: Disciplines,
}

impl Default for Ghoul {
    fn default() -> Self {
        Self {
            humanity: 7,
            humanity_track: MarkTrack::new(HUMANITY_BOXES),
            ghouling_date: None,
            disciplines: Disciplines::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Essence {
    #[default]
    None,
    Dynamic,
    Pattern,
    Primordial,
    Questing,
}

/// Used for both resonance and synergy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resonance {
    #[default]
    None,
    Dynamic,
    Entropic,
    Static,
}

impl fmt::Display for Essence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Resonance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mage {
    pub spheres: Ratings,
    pub paradox: i32,
    pub hubris: i32,
    pub quiet: i32,
    pub arete: i32,
    pub quintessence: i32,
    pub hubris_track: MarkTrack,
    pub quiet_track: MarkTrack,
    pub paradigm: String,
    pub practice: String,
    pub instruments: Vec<String>,
    pub essence: Essence,
    pub resonance: Resonance,
    pub synergy: Resonance,
}

impl Default for Mage {
    fn default() -> Self {
        Self {
            spheres: Ratings::with_keys(&SPHERES, 0),
            paradox: 0,
            hubris: 0,
            quiet: 0,
            arete: 1,
            quintessence: 0,
            hubris_track: MarkTrack::new(MAGE_TRAIT_BOXES),
            quiet_track: MarkTrack::new(MAGE_TRAIT_BOXES),
            paradigm: String::new(),
            practice: String::new(),
            instruments: Vec::new(),
            essence: Essence::None,
            resonance: Resonance::None,
            synergy: Resonance::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    Vampire(Vampire),
    Ghoul(Ghoul),
    Mage(Mage),
}

impl Variant {
    pub fn kind(&self) -> Kind {
        match self {
            Variant::Vampire(_) => Kind::Vampire,
            Variant::Ghoul(_) => Kind::Ghoul,
            Variant::Mage(_) => Kind::Mage,
        }
    }
}

/// A character: the shared sheet plus its type-specific payload.
///
/// The payload is only reachable through typed accessors, so the kind
/// chosen at construction never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub sheet: Sheet,
    variant: Variant,
}

impl Character {
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        let variant = match kind {
            Kind::Vampire => Variant::Vampire(Vampire::default()),
            Kind::Ghoul => Variant::Ghoul(Ghoul::default()),
            Kind::Mage => Variant::Mage(Mage::default()),
        };
        let mut character = Self {
            sheet: Sheet {
                name: name.into(),
                ..Sheet::default()
            },
            variant,
        };
        recalculate(&mut character);
        character
    }

    pub fn new_vampire(name: impl Into<String>) -> Self {
        Self::new(Kind::Vampire, name)
    }

    pub fn new_ghoul(name: impl Into<String>) -> Self {
        Self::new(Kind::Ghoul, name)
    }

    pub fn new_mage(name: impl Into<String>) -> Self {
        Self::new(Kind::Mage, name)
    }

    pub fn id(&self) -> CharacterId {
        self.sheet.id
    }

    pub fn name(&self) -> &str {
        &self.sheet.name
    }

    pub fn kind(&self) -> Kind {
        self.variant.kind()
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn as_vampire(&self) -> Result<&Vampire> {
        match &self.variant {
            Variant::Vampire(v) => Ok(v),
            other => Err(EngineError::wrong_variant(Kind::Vampire, other.kind())),
        }
    }

    pub fn as_vampire_mut(&mut self) -> Result<&mut Vampire> {
        match &mut self.variant {
            Variant::Vampire(v) => Ok(v),
            other => Err(EngineError::wrong_variant(Kind::Vampire, other.kind())),
        }
    }

    pub fn as_ghoul(&self) -> Result<&Ghoul> {
        match &self.variant {
            Variant::Ghoul(g) => Ok(g),
            other => Err(EngineError::wrong_variant(Kind::Ghoul, other.kind())),
        }
    }

    pub fn as_ghoul_mut(&mut self) -> Result<&mut Ghoul> {
        match &mut self.variant {
            Variant::Ghoul(g) => Ok(g),
            other => Err(EngineError::wrong_variant(Kind::Ghoul, other.kind())),
        }
    }

    pub fn as_mage(&self) -> Result<&Mage> {
        match &self.variant {
            Variant::Mage(m) => Ok(m),
            other => Err(EngineError::wrong_variant(Kind::Mage, other.kind())),
        }
    }

    pub fn as_mage_mut(&mut self) -> Result<&mut Mage> {
        match &mut self.variant {
            Variant::Mage(m) => Ok(m),
            other => Err(EngineError::wrong_variant(Kind::Mage, other.kind())),
        }
    }

    /// The discipline ledger, for the kinds that have one.
    pub fn disciplines(&self) -> Option<&Disciplines> {
        match &self.variant {
            Variant::Vampire(v) => Some(&v.disciplines),
            Variant::Ghoul(g) => Some(&g.disciplines),
            Variant::Mage(_) => None,
        }
    }

    /// Mutable ledger access bypasses recalculation; prefer the wrappers
    /// below, or call [`recalculate`] afterwards.
    pub fn disciplines_mut(&mut self) -> Result<&mut Disciplines> {
        match &mut self.variant {
            Variant::Vampire(v) => Ok(&mut v.disciplines),
            Variant::Ghoul(g) => Ok(&mut g.disciplines),
            Variant::Mage(_) => Err(EngineError::wrong_variant(Kind::Vampire, Kind::Mage)),
        }
    }

    pub fn humanity(&self) -> Option<(i32, &MarkTrack)> {
        match &self.variant {
            Variant::Vampire(v) => Some((v.humanity, &v.humanity_track)),
            Variant::Ghoul(g) => Some((g.humanity, &g.humanity_track)),
            Variant::Mage(_) => None,
        }
    }

    pub fn humanity_track_mut(&mut self) -> Result<&mut MarkTrack> {
        match &mut self.variant {
            Variant::Vampire(v) => Ok(&mut v.humanity_track),
            Variant::Ghoul(g) => Ok(&mut g.humanity_track),
            Variant::Mage(_) => Err(EngineError::wrong_variant(Kind::Vampire, Kind::Mage)),
        }
    }

    pub fn set_humanity(&mut self, value: i32) -> Result<()> {
        match &mut self.variant {
            Variant::Vampire(v) => v.humanity = value,
            Variant::Ghoul(g) => g.humanity = value,
            Variant::Mage(_) => return Err(EngineError::wrong_variant(Kind::Vampire, Kind::Mage)),
        }
        Ok(())
    }

    /// Write an attribute in whichever of the three maps holds it.
    pub fn set_attribute(&mut self, name: &str, value: i32) -> Result<Recalculated> {
        let sheet = &mut self.sheet;
        let map = [
            &mut sheet.physical_attributes,
            &mut sheet.social_attributes,
            &mut sheet.mental_attributes,
        ]
        .into_iter()
        .find(|m| m.contains(name))
        .ok_or_else(|| EngineError::UnknownTrait(name.to_string()))?;
        map.set(name, value)?;
        Ok(recalculate(self))
    }

    pub fn set_skill(&mut self, name: &str, value: i32) -> Result<()> {
        let sheet = &mut self.sheet;
        let map = [
            &mut sheet.physical_skills,
            &mut sheet.social_skills,
            &mut sheet.mental_skills,
        ]
        .into_iter()
        .find(|m| m.contains(name))
        .ok_or_else(|| EngineError::UnknownTrait(name.to_string()))?;
        map.set(name, value)?;
        Ok(())
    }

    pub fn set_sphere(&mut self, name: &str, value: i32) -> Result<()> {
        self.as_mage_mut()?.spheres.set(name, value)?;
        Ok(())
    }

    pub fn learn_discipline(&mut self, discipline: Discipline) -> Result<bool> {
        let added = self.disciplines_mut()?.learn(discipline);
        recalculate(self);
        Ok(added)
    }

    pub fn add_custom_discipline(&mut self, discipline: Discipline) -> Result<bool> {
        let added = self.disciplines_mut()?.add_custom_discipline(discipline);
        recalculate(self);
        Ok(added)
    }

    pub fn remove_discipline(&mut self, name: &str) -> Result<Option<Discipline>> {
        let removed = self.disciplines_mut()?.remove_discipline(name);
        recalculate(self);
        Ok(removed)
    }

    pub fn add_custom_power(&mut self, discipline: &str, power: Power) -> Result<PowerId> {
        self.disciplines_mut()?.add_custom_power(discipline, power)
    }

    /// Select or deselect a power, then refresh health and willpower.
    pub fn toggle_power(&mut self, power_id: PowerId, discipline: &str, level: u8) -> Result<Toggle> {
        let toggle = self
            .disciplines_mut()?
            .toggle_power(power_id, discipline, level)?;
        recalculate(self);
        Ok(toggle)
    }

    pub fn award_experience(&mut self, amount: i32) {
        self.sheet.experience += amount;
    }

    pub fn spend_experience(&mut self, amount: i32) {
        self.sheet.spent_experience += amount;
    }

    pub fn add_session(&mut self) -> i32 {
        self.sheet.session_count += 1;
        self.sheet.session_count
    }

    /// Check the stored ratings: attributes, skills and (for a mage) spheres.
    pub fn validate(&self) -> Result<()> {
        self.sheet.validate()?;
        if let Variant::Mage(mage) = &self.variant {
            mage.spheres.validate()?;
        }
        Ok(())
    }

    /// Append a change log entry.
    pub fn log(&mut self, summary: impl Into<String>) -> &ChangeLogEntry {
        self.sheet.change_log.push(ChangeLogEntry::new(summary));
        &self.sheet.change_log[self.sheet.change_log.len() - 1]
    }
}

#[derive(Serialize)]
#[serde(tag = "type", content = "data")]
enum EnvelopeRef<'a> {
    Vampire(FlatRef<'a, Vampire>),
    Ghoul(FlatRef<'a, Ghoul>),
    Mage(FlatRef<'a, Mage>),
}

#[derive(Serialize)]
struct FlatRef<'a, T> {
    #[serde(flatten)]
    sheet: &'a Sheet,
    #[serde(flatten)]
    payload: &'a T,
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "data")]
enum Envelope {
    Vampire(Flat<Vampire>),
    Ghoul(Flat<Ghoul>),
    Mage(Flat<Mage>),
}

#[derive(Deserialize)]
struct Flat<T> {
    #[serde(flatten)]
    sheet: Sheet,
    #[serde(flatten)]
    payload: T,
}

impl Serialize for Character {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let sheet = &self.sheet;
        let envelope = match &self.variant {
            Variant::Vampire(payload) => EnvelopeRef::Vampire(FlatRef { sheet, payload }),
            Variant::Ghoul(payload) => EnvelopeRef::Ghoul(FlatRef { sheet, payload }),
            Variant::Mage(payload) => EnvelopeRef::Mage(FlatRef { sheet, payload }),
        };
        envelope.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Character {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (sheet, variant) = match Envelope::deserialize(deserializer)? {
            Envelope::Vampire(f) => (f.sheet, Variant::Vampire(f.payload)),
            Envelope::Ghoul(f) => (f.sheet, Variant::Ghoul(f.payload)),
            Envelope::Mage(f) => {
                let mut payload = f.payload;
                payload.spheres.fill_missing(&SPHERES, 0);
                (f.sheet, Variant::Mage(payload))
            }
        };
        let mut character = Character { sheet, variant };
        character.sheet.fill_missing();
        character
            .validate()
            .map_err(<D::Error as de::Error>::custom)?;
        recalculate(&mut character);
        Ok(character)
    }
}
