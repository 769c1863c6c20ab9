//! JSON-in / JSON-out entry points for hosts that only speak strings.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::character::{Character, Kind};
use crate::derived::recalculate;
use crate::diff::{diff, summarize};
use crate::discipline::Toggle;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiffRequest {
    pub before: Character,
    pub after: Character,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DiffResult {
    pub changes: Vec<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToggleRequest {
    pub character: Character,
    pub discipline: String,
    pub power: String,
    pub level: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ToggleResult {
    pub selected: bool,
    pub current_level: i32,
    pub character: Character,
}

/// Text from raw bytes, honoring a UTF-8 or UTF-16 byte order mark.
pub fn decode_text(bytes: Vec<u8>) -> Result<String> {
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

pub fn read_text_auto(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    decode_text(bytes)
}

pub fn load_character(path: &Path) -> Result<Character> {
    let text = read_text_auto(path)?;
    parse_character(&text).with_context(|| format!("failed to parse character JSON: {}", path.display()))
}

pub fn parse_character(json: &str) -> Result<Character> {
    Ok(serde_json::from_str(json)?)
}

pub fn new_character_json(kind: &str, name: &str) -> Result<String> {
    let kind: Kind = kind.parse()?;
    Ok(serde_json::to_string(&Character::new(kind, name))?)
}

pub fn diff_characters(request: DiffRequest) -> Result<DiffResult> {
    let changes = diff(&request.before, &request.after)?;
    let summary = summarize(&changes);
    Ok(DiffResult { changes, summary })
}

pub fn diff_json(json: &str) -> Result<DiffResult> {
    let request: DiffRequest = serde_json::from_str(json).context("invalid diff request")?;
    diff_characters(request)
}

/// Decode, bring derived values up to date, re-encode.
pub fn recalculate_json(json: &str) -> Result<String> {
    let mut character = parse_character(json)?;
    recalculate(&mut character);
    Ok(serde_json::to_string(&character)?)
}

/// Toggle a power picked by name; the host rarely has power ids at hand.
pub fn toggle_power(request: ToggleRequest) -> Result<ToggleResult> {
    let ToggleRequest {
        mut character,
        discipline,
        power,
        level,
    } = request;
    let owned = character
        .disciplines()
        .ok_or_else(|| anyhow!("{} characters have no disciplines", character.kind()))?
        .get(&discipline)
        .ok_or_else(|| anyhow!("character has no discipline named '{}'", discipline))?;
    let power_id = owned
        .powers(level)
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(&power))
        .map(|p| p.id)
        .ok_or_else(|| anyhow!("power '{}' not found at level {} of {}", power, level, discipline))?;

    let toggle = character.toggle_power(power_id, &discipline, level)?;
    let current_level = character
        .disciplines()
        .and_then(|d| d.get(&discipline))
        .map(|d| d.current_level())
        .unwrap_or(0);
    Ok(ToggleResult {
        selected: toggle == Toggle::Selected,
        current_level,
        character,
    })
}

/// Names a character could still learn (plus its custom disciplines).
pub fn available_disciplines(character: &Character) -> Result<Vec<String>> {
    Ok(crate::available_disciplines(character)?
        .into_iter()
        .map(|d| d.name)
        .collect())
}

pub fn available_disciplines_json(json: &str) -> Result<Vec<String>> {
    available_disciplines(&parse_character(json)?)
}
