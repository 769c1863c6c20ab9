//! Structural comparison of two snapshots of the same character.
//!
//! Output order is fixed: common scalars, string lists, merits and flaws,
//! backgrounds, ratings and tracks, disciplines, then the type-specific
//! fields. Set-like collections are reported in alphabetical order.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Display;

use chrono::NaiveDate;

use crate::character::{Character, Ghoul, Mage, Variant, Vampire};
use crate::discipline::{Discipline, Disciplines};
use crate::error::{EngineError, Result};
use crate::track::{BoxState, DamageState, MarkState, Track};
use crate::traits::{Advantage, Background, Ratings, Specialization};

/// Describe every change from `original` to `updated`, one line per change.
pub fn diff(original: &Character, updated: &Character) -> Result<Vec<String>> {
    if original.kind() != updated.kind() {
        return Err(EngineError::wrong_variant(original.kind(), updated.kind()));
    }

    let mut out = Vec::new();
    let (a, b) = (&original.sheet, &updated.sheet);

    scalar(&mut out, "name", &a.name, &b.name);
    scalar(&mut out, "concept", &a.concept, &b.concept);
    scalar(&mut out, "chronicle", &a.chronicle, &b.chronicle);
    scalar(&mut out, "ambition", &a.ambition, &b.ambition);
    scalar(&mut out, "desire", &a.desire, &b.desire);
    text(&mut out, "description", &a.description, &b.description);
    text(&mut out, "notes", &a.notes, &b.notes);
    date(&mut out, "birth date", a.birth_date, b.birth_date);
    scalar(&mut out, "experience", &a.experience, &b.experience);
    scalar(&mut out, "spent experience", &a.spent_experience, &b.spent_experience);
    scalar(&mut out, "sessions", &a.session_count, &b.session_count);

    string_list(&mut out, "convictions", &a.convictions, &b.convictions);
    string_list(&mut out, "touchstones", &a.touchstones, &b.touchstones);

    advantages(&mut out, "advantages", &a.advantages, &b.advantages);
    advantages(&mut out, "flaws", &a.flaws, &b.flaws);

    backgrounds(&mut out, "background merit", &a.background_merits, &b.background_merits);
    backgrounds(&mut out, "background flaw", &a.background_flaws, &b.background_flaws);

    for (old, new) in a.attribute_maps().into_iter().zip(b.attribute_maps()) {
        ratings(&mut out, old, new);
    }
    for (old, new) in a.skill_maps().into_iter().zip(b.skill_maps()) {
        ratings(&mut out, old, new);
    }
    string_list(
        &mut out,
        "specializations",
        &labels(&a.specializations),
        &labels(&b.specializations),
    );

    scalar(&mut out, "health", &a.health, &b.health);
    track_counts(&mut out, "health", &a.health_track, &b.health_track, &DAMAGE_MARKS);
    scalar(&mut out, "willpower", &a.willpower, &b.willpower);
    track_counts(&mut out, "willpower", &a.willpower_track, &b.willpower_track, &DAMAGE_MARKS);

    if let (Some(old), Some(new)) = (original.disciplines(), updated.disciplines()) {
        disciplines(&mut out, old, new);
    }

    match (original.variant(), updated.variant()) {
        (Variant::Vampire(old), Variant::Vampire(new)) => vampire(&mut out, old, new),
        (Variant::Ghoul(old), Variant::Ghoul(new)) => ghoul(&mut out, old, new),
        (Variant::Mage(old), Variant::Mage(new)) => mage(&mut out, old, new),
        (old, new) => return Err(EngineError::wrong_variant(old.kind(), new.kind())),
    }

    Ok(out)
}

/// Newline-joined change log text, or `None` when nothing changed.
pub fn summarize(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

const DAMAGE_MARKS: [(DamageState, &str); 2] = [
    (DamageState::Superficial, "superficial"),
    (DamageState::Aggravated, "aggravated"),
];
const STAINS: [(MarkState, &str); 2] = [(MarkState::Checked, "checked"), (MarkState::Stained, "stained")];

fn vampire(out: &mut Vec<String>, a: &Vampire, b: &Vampire) {
    scalar(out, "clan", &a.clan, &b.clan);
    scalar(out, "generation", &a.generation, &b.generation);
    scalar(out, "blood potency", &a.blood_potency, &b.blood_potency);
    scalar(out, "hunger", &a.hunger, &b.hunger);
    scalar(out, "humanity", &a.humanity, &b.humanity);
    scalar(out, "predator type", &a.predator_type, &b.predator_type);
    date(out, "embrace date", a.embrace_date, b.embrace_date);
    string_list(
        out,
        "custom predator types",
        &a.custom_predator_types,
        &b.custom_predator_types,
    );
    track_counts(out, "humanity", &a.humanity_track, &b.humanity_track, &STAINS);
}

fn ghoul(out: &mut Vec<String>, a: &Ghoul, b: &Ghoul) {
    scalar(out, "humanity", &a.humanity, &b.humanity);
    date(out, "ghouling date", a.ghouling_date, b.ghouling_date);
    track_counts(out, "humanity", &a.humanity_track, &b.humanity_track, &STAINS);
}

fn mage(out: &mut Vec<String>, a: &Mage, b: &Mage) {
    ratings(out, &a.spheres, &b.spheres);
    scalar(out, "paradigm", &a.paradigm, &b.paradigm);
    scalar(out, "practice", &a.practice, &b.practice);
    scalar(out, "essence", &a.essence, &b.essence);
    scalar(out, "resonance", &a.resonance, &b.resonance);
    scalar(out, "synergy", &a.synergy, &b.synergy);
    scalar(out, "arete", &a.arete, &b.arete);
    scalar(out, "paradox", &a.paradox, &b.paradox);
    scalar(out, "hubris", &a.hubris, &b.hubris);
    scalar(out, "quiet", &a.quiet, &b.quiet);
    scalar(out, "quintessence", &a.quintessence, &b.quintessence);
    string_list(out, "instruments", &a.instruments, &b.instruments);
    track_counts(out, "hubris", &a.hubris_track, &b.hubris_track, &STAINS);
    track_counts(out, "quiet", &a.quiet_track, &b.quiet_track, &STAINS);
}

fn scalar<T: PartialEq + Display + ?Sized>(out: &mut Vec<String>, field: &str, old: &T, new: &T) {
    if old != new {
        out.push(format!("{field} {old}→{new}"));
    }
}

fn text(out: &mut Vec<String>, field: &str, old: &str, new: &str) {
    if old != new {
        out.push(format!("{field} updated"));
    }
}

fn date(out: &mut Vec<String>, field: &str, old: Option<NaiveDate>, new: Option<NaiveDate>) {
    if old != new {
        let show = |d: Option<NaiveDate>| d.map_or_else(|| "none".to_string(), |d| d.to_string());
        out.push(format!("{field} {}→{}", show(old), show(new)));
    }
}

/// Order-insensitive comparison: removed entries first, then added.
fn string_list(out: &mut Vec<String>, field: &str, old: &[String], new: &[String]) {
    let old: BTreeSet<&str> = old.iter().map(String::as_str).collect();
    let new: BTreeSet<&str> = new.iter().map(String::as_str).collect();
    added_removed(out, field, &old, &new);
}

fn added_removed(out: &mut Vec<String>, field: &str, old: &BTreeSet<&str>, new: &BTreeSet<&str>) {
    let removed: Vec<&str> = old.difference(new).copied().collect();
    let added: Vec<&str> = new.difference(old).copied().collect();
    if !removed.is_empty() {
        out.push(format!("{field} removed: {}", removed.join(", ")));
    }
    if !added.is_empty() {
        out.push(format!("{field} added: {}", added.join(", ")));
    }
}

/// Value-keyed lists: an entry whose cost changed counts as removed and added.
fn advantages(out: &mut Vec<String>, field: &str, old: &[Advantage], new: &[Advantage]) {
    let old_set: HashSet<&Advantage> = old.iter().collect();
    let new_set: HashSet<&Advantage> = new.iter().collect();
    let names = |from: &HashSet<&Advantage>, minus: &HashSet<&Advantage>| -> Vec<String> {
        let mut names: Vec<String> = from
            .difference(minus)
            .map(|a| a.name.clone())
            .collect();
        names.sort();
        names
    };
    let removed = names(&old_set, &new_set);
    let added = names(&new_set, &old_set);
    if !removed.is_empty() {
        out.push(format!("{field} removed: {}", removed.join(", ")));
    }
    if !added.is_empty() {
        out.push(format!("{field} added: {}", added.join(", ")));
    }
}

/// Identity-keyed lists: removed, added, then modified entries.
fn backgrounds(out: &mut Vec<String>, kind: &str, old: &[Background], new: &[Background]) {
    let old_by_id: HashMap<_, &Background> = old.iter().map(|b| (b.id, b)).collect();
    let new_by_id: HashMap<_, &Background> = new.iter().map(|b| (b.id, b)).collect();

    let mut removed: Vec<&Background> = old.iter().filter(|b| !new_by_id.contains_key(&b.id)).collect();
    let mut added: Vec<&Background> = new.iter().filter(|b| !old_by_id.contains_key(&b.id)).collect();
    removed.sort_by(|x, y| x.name.cmp(&y.name));
    added.sort_by(|x, y| x.name.cmp(&y.name));

    if !removed.is_empty() {
        out.push(format!("{kind} removed: {}", with_costs(&removed)));
    }
    if !added.is_empty() {
        out.push(format!("{kind} added: {}", with_costs(&added)));
    }

    let mut modified: Vec<(&Background, Vec<String>)> = new
        .iter()
        .filter_map(|after| {
            let before = old_by_id.get(&after.id)?;
            let mut changes = Vec::new();
            if before.name != after.name {
                changes.push(format!("name {} → {}", before.name, after.name));
            }
            if before.cost != after.cost {
                changes.push(format!("cost {} → {}", before.cost, after.cost));
            }
            if before.comment != after.comment {
                changes.push("comment updated".to_string());
            }
            (!changes.is_empty()).then_some((after, changes))
        })
        .collect();
    modified.sort_by(|x, y| x.0.name.cmp(&y.0.name));
    for (bg, changes) in modified {
        out.push(format!("{kind} {} modified: {}", bg.name, changes.join(", ")));
    }
}

fn labels(specializations: &[Specialization]) -> Vec<String> {
    specializations.iter().map(ToString::to_string).collect()
}

fn with_costs(list: &[&Background]) -> String {
    list.iter()
        .map(|b| format!("{} ({} pts)", b.name, b.cost))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every key of either map, in the original's order then any new keys.
fn ratings(out: &mut Vec<String>, old: &Ratings, new: &Ratings) {
    let keys = old.keys().chain(new.keys().filter(|k| !old.contains(k)));
    for key in keys {
        let (before, after) = (old.get(key), new.get(key));
        if before != after {
            let show = |v: Option<i32>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
            out.push(format!("{} {}→{}", key.to_lowercase(), show(before), show(after)));
        }
    }
}

fn track_counts<S: BoxState>(
    out: &mut Vec<String>,
    field: &str,
    old: &Track<S>,
    new: &Track<S>,
    states: &[(S, &str)],
) {
    for (state, label) in states {
        let (before, after) = (old.count(*state), new.count(*state));
        if before != after {
            out.push(format!("{field} {label} {before}→{after}"));
        }
    }
}

fn disciplines(out: &mut Vec<String>, old: &Disciplines, new: &Disciplines) {
    let names: BTreeSet<&str> = old.names().chain(new.names()).collect();
    for name in names {
        match (old.get(name), new.get(name)) {
            (Some(_), None) => out.push(format!("lost {name}")),
            (None, Some(d)) => {
                out.push(format!("learned {name}({})", d.selected_power_names().join(", ")));
            }
            (Some(before), Some(after)) => {
                let before_names = before.selected_power_names();
                let after_names = after.selected_power_names();
                let before_set: BTreeSet<&str> = before_names.iter().map(String::as_str).collect();
                let after_set: BTreeSet<&str> = after_names.iter().map(String::as_str).collect();
                added_removed(out, &format!("{name} powers"), &before_set, &after_set);
                added_removed(
                    out,
                    &format!("{name} custom powers"),
                    &custom_powers(before),
                    &custom_powers(after),
                );
                scalar(
                    out,
                    &format!("{name} all levels allowed"),
                    &before.allow_all_levels,
                    &after.allow_all_levels,
                );
                text(out, &format!("{name} description"), &before.description, &after.description);
            }
            (None, None) => {}
        }
    }
}

fn custom_powers(discipline: &Discipline) -> BTreeSet<&str> {
    discipline
        .powers
        .values()
        .flatten()
        .filter(|p| p.is_custom)
        .map(|p| p.name.as_str())
        .collect()
}
