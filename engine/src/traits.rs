use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::ids::BackgroundId;

pub const PHYSICAL_ATTRIBUTES: [&str; 3] = ["Strength", "Dexterity", "Stamina"];
pub const SOCIAL_ATTRIBUTES: [&str; 3] = ["Charisma", "Manipulation", "Composure"];
pub const MENTAL_ATTRIBUTES: [&str; 3] = ["Intelligence", "Wits", "Resolve"];

pub const PHYSICAL_SKILLS: [&str; 9] = [
    "Athletics", "Brawl", "Craft", "Drive", "Firearms", "Larceny", "Melee", "Stealth", "Survival",
];
pub const SOCIAL_SKILLS: [&str; 9] = [
    "Animal Ken",
    "Etiquette",
    "Insight",
    "Intimidation",
    "Leadership",
    "Performance",
    "Persuasion",
    "Streetwise",
    "Subterfuge",
];
pub const MENTAL_SKILLS: [&str; 9] = [
    "Academics",
    "Awareness",
    "Finance",
    "Investigation",
    "Medicine",
    "Occult",
    "Politics",
    "Science",
    "Technology",
];

pub const SPHERES: [&str; 9] = [
    "Correspondence",
    "Entropy",
    "Forces",
    "Life",
    "Matter",
    "Mind",
    "Prime",
    "Spirit",
    "Time",
];

pub const MAX_RATING: i32 = 5;
pub const ATTRIBUTE_DEFAULT: i32 = 1;

/// Ordered name → dot rating map. Key order follows the fixed key set the
/// map was created from, which keeps diffs and exports stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratings(IndexMap<String, i32>);

impl Ratings {
    pub fn with_keys(keys: &[&str], value: i32) -> Self {
        Self(keys.iter().map(|k| (k.to_string(), value)).collect())
    }

    /// Rating for `name`, or `fallback` when the key is missing.
    pub fn get_or(&self, name: &str, fallback: i32) -> i32 {
        self.0.get(name).copied().unwrap_or(fallback)
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Write a rating. Returns the previous value.
    pub fn set(&mut self, name: &str, value: i32) -> Result<i32> {
        if !(0..=MAX_RATING).contains(&value) {
            return Err(EngineError::RatingOutOfRange {
                name: name.to_string(),
                value,
            });
        }
        match self.0.get_mut(name) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(EngineError::UnknownTrait(name.to_string())),
        }
    }

    /// Re-add any key from `keys` that an older payload did not carry.
    pub fn fill_missing(&mut self, keys: &[&str], value: i32) {
        for key in keys {
            if !self.0.contains_key(*key) {
                self.0.insert(key.to_string(), value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// First rating outside 0..=5, as an error.
    pub fn validate(&self) -> Result<()> {
        match self.0.iter().find(|(_, v)| !(0..=MAX_RATING).contains(*v)) {
            Some((name, value)) => Err(EngineError::RatingOutOfRange {
                name: name.clone(),
                value: *value,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Specialization {
    pub skill: String,
    pub name: String,
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.skill, self.name)
    }
}

/// Merit or flaw compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Advantage {
    pub name: String,
    #[serde(default)]
    pub cost: i32,
}

impl Advantage {
    pub fn new(name: impl Into<String>, cost: i32) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }
}

/// Background merit or flaw. Identity is the id; cost and comment may be
/// edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    #[serde(default)]
    pub id: BackgroundId,
    pub name: String,
    #[serde(default)]
    pub cost: i32,
    #[serde(default)]
    pub comment: String,
}

impl Background {
    pub fn new(name: impl Into<String>, cost: i32) -> Self {
        Self {
            id: BackgroundId::new(),
            name: name.into(),
            cost,
            comment: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_rejects_unknown_keys_and_out_of_range() {
        let mut r = Ratings::with_keys(&PHYSICAL_ATTRIBUTES, ATTRIBUTE_DEFAULT);
        assert!(matches!(r.set("Luck", 2), Err(EngineError::UnknownTrait(_))));
        assert!(matches!(
            r.set("Stamina", 6),
            Err(EngineError::RatingOutOfRange { value: 6, .. })
        ));
        assert_eq!(r.set("Stamina", 3).unwrap(), 1);
        assert_eq!(r.get_or("Stamina", 0), 3);
    }

    #[test]
    fn fill_missing_keeps_existing_values() {
        let mut r = Ratings::with_keys(&["Strength"], 4);
        r.fill_missing(&PHYSICAL_ATTRIBUTES, ATTRIBUTE_DEFAULT);
        assert_eq!(r.get("Strength"), Some(4));
        assert_eq!(r.get("Stamina"), Some(1));
        assert_eq!(r.keys().count(), 3);
    }
}
