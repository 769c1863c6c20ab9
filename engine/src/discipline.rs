//! Disciplines: a leveled catalog of powers plus the character's picks.
//!
//! Progress is cumulative: every selected power counts toward the
//! discipline's current level regardless of the level it sits at.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};
use crate::ids::{DisciplineId, PowerId};

pub const MAX_LEVEL: u8 = 5;

/// Level key of the power maps. Reads both `1` and `"1"` so payloads that
/// pass through buffered (flattened) deserialization still decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Level(pub u8);

impl Level {
    /// `Some` for levels 1 through [`MAX_LEVEL`].
    pub fn checked(level: u8) -> Option<Level> {
        (1..=MAX_LEVEL).contains(&level).then_some(Level(level))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LevelVisitor;

        impl Visitor<'_> for LevelVisitor {
            type Value = Level;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a discipline level as a number or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Level, E> {
                u8::try_from(v)
                    .ok()
                    .and_then(Level::checked)
                    .ok_or_else(|| E::custom(format!("level {v} is outside 1..={MAX_LEVEL}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Level, E> {
                u8::try_from(v)
                    .ok()
                    .and_then(Level::checked)
                    .ok_or_else(|| E::custom(format!("level {v} is outside 1..={MAX_LEVEL}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Level, E> {
                let level = v
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| E::custom(format!("invalid level '{v}'")))?;
                Level::checked(level)
                    .ok_or_else(|| E::custom(format!("level {v} is outside 1..={MAX_LEVEL}")))
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Power {
    #[serde(default)]
    pub id: PowerId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub add_to_health: bool,
    #[serde(default)]
    pub add_to_willpower: bool,
}

fn default_level() -> u8 {
    1
}

impl Power {
    pub fn custom(name: impl Into<String>, level: u8) -> Self {
        Self {
            id: PowerId::new(),
            name: name.into(),
            description: String::new(),
            level,
            is_custom: true,
            add_to_health: false,
            add_to_willpower: false,
        }
    }
}

/// Whether a toggle selected or deselected the power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discipline {
    #[serde(default)]
    pub id: DisciplineId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub powers: BTreeMap<Level, Vec<Power>>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub selected: BTreeMap<Level, Vec<Power>>,
    #[serde(default)]
    pub allow_all_levels: bool,
}

impl Discipline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DisciplineId::new(),
            name: name.into(),
            description: String::new(),
            powers: BTreeMap::new(),
            is_custom: false,
            selected: BTreeMap::new(),
            allow_all_levels: false,
        }
    }

    /// Cumulative count of selected powers across every level.
    pub fn current_level(&self) -> i32 {
        self.selected.values().map(|p| p.len() as i32).sum()
    }

    pub fn is_level_available(&self, level: u8) -> bool {
        self.allow_all_levels || i32::from(level) <= self.current_level() + 1
    }

    /// Powers offered at `level`.
    pub fn powers(&self, level: u8) -> &[Power] {
        self.powers
            .get(&Level(level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn selected_at(&self, level: u8) -> &[Power] {
        self.selected
            .get(&Level(level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_selected(&self, power_id: PowerId) -> bool {
        self.selected
            .values()
            .flatten()
            .any(|p| p.id == power_id)
    }

    /// Select the power if it is not selected at `level`, deselect it
    /// otherwise. The id must be one of [`Discipline::powers`] at `level`.
    pub fn toggle_power(&mut self, power_id: PowerId, level: u8) -> Result<Toggle> {
        let power = self
            .powers(level)
            .iter()
            .find(|p| p.id == power_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownPower {
                discipline: self.name.clone(),
                level,
                power_id: power_id.to_string(),
            })?;

        let picks = self.selected.entry(Level(level)).or_default();
        if let Some(pos) = picks.iter().position(|p| p.id == power_id) {
            picks.remove(pos);
            if picks.is_empty() {
                self.selected.remove(&Level(level));
            }
            Ok(Toggle::Deselected)
        } else {
            picks.push(power);
            Ok(Toggle::Selected)
        }
    }

    /// Add a power to the catalog at its own level.
    pub fn add_power(&mut self, power: Power) {
        self.powers.entry(Level(power.level)).or_default().push(power);
    }

    /// Selected power names in level order.
    pub fn selected_power_names(&self) -> Vec<String> {
        self.selected
            .values()
            .flatten()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Each selected power flagged for health adds the discipline's
    /// current level.
    pub fn health_bonus(&self) -> i32 {
        self.bonus(|p| p.add_to_health)
    }

    pub fn willpower_bonus(&self) -> i32 {
        self.bonus(|p| p.add_to_willpower)
    }

    fn bonus(&self, applies: impl Fn(&Power) -> bool) -> i32 {
        let level = self.current_level();
        self.selected
            .values()
            .flatten()
            .filter(|p| applies(p))
            .map(|_| level)
            .sum()
    }
}

/// The disciplines a character owns, keyed by name in learning order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Disciplines(IndexMap<String, Discipline>);

impl Disciplines {
    pub fn get(&self, name: &str) -> Option<&Discipline> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Discipline> {
        self.0.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take a catalog discipline. Returns false if the name is already owned.
    pub fn learn(&mut self, discipline: Discipline) -> bool {
        if self.0.contains_key(&discipline.name) {
            return false;
        }
        self.0.insert(discipline.name.clone(), discipline);
        true
    }

    /// Insert a user-defined discipline, marked custom. Existing names are left alone.
    pub fn add_custom_discipline(&mut self, mut discipline: Discipline) -> bool {
        if self.0.contains_key(&discipline.name) {
            return false;
        }
        discipline.is_custom = true;
        self.0.insert(discipline.name.clone(), discipline);
        true
    }

    /// Drop the discipline and its selections. Unknown names are a no-op.
    pub fn remove_discipline(&mut self, name: &str) -> Option<Discipline> {
        self.0.shift_remove(name)
    }

    pub fn toggle_power(&mut self, power_id: PowerId, discipline: &str, level: u8) -> Result<Toggle> {
        self.0
            .get_mut(discipline)
            .ok_or_else(|| EngineError::UnknownDiscipline(discipline.to_string()))?
            .toggle_power(power_id, level)
    }

    pub fn add_custom_power(&mut self, discipline: &str, mut power: Power) -> Result<PowerId> {
        let entry = self
            .0
            .get_mut(discipline)
            .ok_or_else(|| EngineError::UnknownDiscipline(discipline.to_string()))?;
        power.is_custom = true;
        let id = power.id;
        entry.add_power(power);
        Ok(id)
    }

    pub fn set_allow_all_levels(&mut self, discipline: &str, allow: bool) -> Result<()> {
        self.0
            .get_mut(discipline)
            .ok_or_else(|| EngineError::UnknownDiscipline(discipline.to_string()))?
            .allow_all_levels = allow;
        Ok(())
    }

    /// Catalog entries not yet owned, followed by the character's own
    /// custom disciplines.
    pub fn available(&self, catalog: &[Discipline]) -> Vec<Discipline> {
        catalog
            .iter()
            .filter(|d| !self.0.contains_key(&d.name))
            .chain(self.0.values().filter(|d| d.is_custom))
            .cloned()
            .collect()
    }

    pub fn health_bonus(&self) -> i32 {
        self.0.values().map(Discipline::health_bonus).sum()
    }

    pub fn willpower_bonus(&self) -> i32 {
        self.0.values().map(Discipline::willpower_bonus).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fortitude() -> Discipline {
        let mut d = Discipline::new("Fortitude");
        let mut resilience = Power::custom("Resilience", 1);
        resilience.add_to_health = true;
        d.add_power(resilience);
        d.add_power(Power::custom("Unswayable Mind", 1));
        d.add_power(Power::custom("Toughness", 2));
        d
    }

    #[test]
    fn toggling_twice_restores_selection() {
        let mut d = fortitude();
        let id = d.powers(1)[0].id;
        assert_eq!(d.toggle_power(id, 1).unwrap(), Toggle::Selected);
        assert_eq!(d.current_level(), 1);
        assert_eq!(d.toggle_power(id, 1).unwrap(), Toggle::Deselected);
        assert_eq!(d.current_level(), 0);
        assert!(d.selected.is_empty());
    }

    #[test]
    fn level_gate_follows_selection_count() {
        let mut d = fortitude();
        assert!(d.is_level_available(1));
        assert!(!d.is_level_available(2));
        let id = d.powers(1)[1].id;
        d.toggle_power(id, 1).unwrap();
        assert!(d.is_level_available(2));
        assert!(!d.is_level_available(3));
        d.allow_all_levels = true;
        assert!(d.is_level_available(5));
    }

    #[test]
    fn bonus_multiplies_by_current_level() {
        let mut d = fortitude();
        let resilience = d.powers(1)[0].id;
        let mind = d.powers(1)[1].id;
        let tough = d.powers(2)[0].id;
        d.toggle_power(resilience, 1).unwrap();
        assert_eq!(d.health_bonus(), 1);
        d.toggle_power(mind, 1).unwrap();
        d.toggle_power(tough, 2).unwrap();
        assert_eq!(d.health_bonus(), 3);
        assert_eq!(d.willpower_bonus(), 0);
    }

    #[test]
    fn unknown_power_fails_loudly() {
        let mut d = fortitude();
        let stranger = PowerId::new();
        let before = d.clone();
        assert!(matches!(
            d.toggle_power(stranger, 1),
            Err(EngineError::UnknownPower { level: 1, .. })
        ));
        // a level-2 power toggled at level 1 is also rejected
        let tough = d.powers(2)[0].id;
        assert!(d.toggle_power(tough, 1).is_err());
        assert_eq!(d, before);
    }

    #[test]
    fn level_keys_accept_strings_and_numbers() {
        let json = r#"{"name":"Potence","powers":{"1":[{"name":"Lethal Body"}]},"selected":{}}"#;
        let d: Discipline = serde_json::from_str(json).unwrap();
        assert_eq!(d.powers(1)[0].name, "Lethal Body");
        let level: Level = serde_json::from_str("3").unwrap();
        assert_eq!(level, Level(3));
    }

    #[test]
    fn level_keys_outside_the_ladder_are_rejected() {
        assert!(serde_json::from_str::<Level>("0").is_err());
        assert!(serde_json::from_str::<Level>("200").is_err());
        assert!(serde_json::from_str::<Level>("6").is_err());
        let json = r#"{"name":"Potence","powers":{"0":[{"name":"Lethal Body"}]}}"#;
        assert!(serde_json::from_str::<Discipline>(json).is_err());
    }
}
