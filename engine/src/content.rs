use std::collections::BTreeMap;

use serde::Deserialize;

use crate::discipline::{Discipline, Level, Power};
use crate::error::{EngineError, Result};
use crate::ids::{DisciplineId, PowerId};

const DISCIPLINES_YAML: &str = include_str!("../content/disciplines.yaml");

pub const CLANS: [&str; 15] = [
    "Banu Haqim",
    "Brujah",
    "Caitiff",
    "Gangrel",
    "Hecata",
    "Lasombra",
    "Malkavian",
    "Ministry",
    "Nosferatu",
    "Ravnos",
    "Salubri",
    "Thin-blood",
    "Toreador",
    "Tremere",
    "Tzimisce",
];

pub const PREDATOR_TYPES: [&str; 10] = [
    "Alleycat",
    "Bagger",
    "Blood Leech",
    "Cleaver",
    "Consensualist",
    "Farmer",
    "Osiris",
    "Sandman",
    "Scene Queen",
    "Siren",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDiscipline {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    powers: BTreeMap<u8, Vec<CatalogPower>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogPower {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    add_to_health: bool,
    #[serde(default)]
    add_to_willpower: bool,
}

/// The built-in discipline catalog, in catalog order.
///
/// Ids are derived from names, so a power picked from one load of the
/// catalog matches the same power in any other load.
pub fn standard_disciplines() -> Result<Vec<Discipline>> {
    parse_catalog(DISCIPLINES_YAML)
}

pub fn standard_discipline(name: &str) -> Result<Discipline> {
    standard_disciplines()?
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| EngineError::UnknownDiscipline(name.to_string()))
}

fn parse_catalog(yaml: &str) -> Result<Vec<Discipline>> {
    let entries: Vec<CatalogDiscipline> =
        serde_yaml::from_str(yaml).map_err(|e| EngineError::Decode(e.to_string()))?;
    Ok(entries.into_iter().map(into_discipline).collect())
}

fn into_discipline(entry: CatalogDiscipline) -> Discipline {
    let mut discipline = Discipline::new(entry.name.clone());
    discipline.id = DisciplineId::derived(&entry.name);
    discipline.description = entry.description;
    for (level, powers) in entry.powers {
        let list = powers
            .into_iter()
            .map(|p| Power {
                id: PowerId::derived(&format!("{}/{}", entry.name, p.name)),
                name: p.name,
                description: p.description,
                level,
                is_custom: false,
                add_to_health: p.add_to_health,
                add_to_willpower: p.add_to_willpower,
            })
            .collect();
        discipline.powers.insert(Level(level), list);
    }
    discipline
}
