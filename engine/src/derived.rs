use tracing::{debug, warn};

use crate::character::Character;
use crate::track::{DamageTrack, Resize};

/// Which capacities changed during a [`recalculate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recalculated {
    pub health: Option<Resize>,
    pub willpower: Option<Resize>,
}

impl Recalculated {
    pub fn changed(&self) -> bool {
        self.health.is_some() || self.willpower.is_some()
    }
}

/// Stamina + 3 plus discipline health bonuses.
pub fn health_capacity(character: &Character) -> i32 {
    let bonus = character
        .disciplines()
        .map(|d| d.health_bonus())
        .unwrap_or(0);
    character.sheet.attribute("Stamina") + 3 + bonus
}

/// Resolve + Composure plus discipline willpower bonuses.
pub fn willpower_capacity(character: &Character) -> i32 {
    let bonus = character
        .disciplines()
        .map(|d| d.willpower_bonus())
        .unwrap_or(0);
    character.sheet.attribute("Resolve") + character.sheet.attribute("Composure") + bonus
}

/// Bring health and willpower (and their tracks) in line with the current
/// attributes and discipline picks. Touches nothing else.
pub fn recalculate(character: &mut Character) -> Recalculated {
    let health = health_capacity(character);
    let willpower = willpower_capacity(character);
    let name = character.sheet.name.clone();
    let sheet = &mut character.sheet;

    let mut out = Recalculated::default();
    if health != sheet.health || track_len(&sheet.health_track) != health {
        debug!(character = %name, from = sheet.health, to = health, "health capacity changed");
        sheet.health = health;
        out.health = Some(fit(&name, "health", &mut sheet.health_track, health));
    }
    if willpower != sheet.willpower || track_len(&sheet.willpower_track) != willpower {
        debug!(character = %name, from = sheet.willpower, to = willpower, "willpower capacity changed");
        sheet.willpower = willpower;
        out.willpower = Some(fit(&name, "willpower", &mut sheet.willpower_track, willpower));
    }
    out
}

fn track_len(track: &DamageTrack) -> i32 {
    track.len() as i32
}

fn fit(name: &str, label: &str, track: &mut DamageTrack, capacity: i32) -> Resize {
    let resize = track.resize(capacity.max(0) as usize);
    if resize.dropped_marks > 0 {
        warn!(
            character = %name,
            track = label,
            lost = resize.dropped_marks,
            "track shrank past recorded damage"
        );
    }
    resize
}
