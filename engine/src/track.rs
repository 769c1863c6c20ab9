use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One box of a health or willpower track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageState {
    #[default]
    Ok,
    Superficial,
    Aggravated,
}

/// One box of a humanity, hubris or quiet track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkState {
    #[default]
    Unchecked,
    Checked,
    Stained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    Superficial,
    Aggravated,
}

pub trait BoxState: Copy + Default + PartialEq {
    /// State a box takes when tapped.
    fn cycle(self) -> Self;

    fn is_marked(self) -> bool {
        self != Self::default()
    }
}

impl BoxState for DamageState {
    fn cycle(self) -> Self {
        match self {
            DamageState::Ok => DamageState::Superficial,
            DamageState::Superficial => DamageState::Aggravated,
            DamageState::Aggravated => DamageState::Ok,
        }
    }
}

impl BoxState for MarkState {
    fn cycle(self) -> Self {
        match self {
            MarkState::Unchecked => MarkState::Checked,
            MarkState::Checked => MarkState::Stained,
            MarkState::Stained => MarkState::Unchecked,
        }
    }
}

/// Outcome of a [`Track::resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resize {
    pub from: usize,
    pub to: usize,
    /// Marked boxes that fell off the end when shrinking.
    pub dropped_marks: usize,
}

/// Ordered sequence of box states.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track<S>(Vec<S>);

pub type DamageTrack = Track<DamageState>;
pub type MarkTrack = Track<MarkState>;

impl<S: BoxState> Track<S> {
    pub fn new(len: usize) -> Self {
        Self(vec![S::default(); len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn boxes(&self) -> &[S] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<S> {
        self.0.get(index).copied()
    }

    pub fn count(&self, state: S) -> usize {
        self.0.iter().filter(|s| **s == state).count()
    }

    /// Grow with default boxes, or truncate from the end. Marks in the
    /// retained prefix are untouched; marks past `len` are lost.
    pub fn resize(&mut self, len: usize) -> Resize {
        let from = self.0.len();
        let dropped_marks = self
            .0
            .iter()
            .skip(len)
            .filter(|s| s.is_marked())
            .count();
        self.0.resize(len, S::default());
        Resize {
            from,
            to: len,
            dropped_marks,
        }
    }

    /// Advance the box at `index` to its next state and return it.
    pub fn cycle(&mut self, index: usize) -> Result<S> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or(EngineError::BoxOutOfRange { index, len })?;
        *slot = slot.cycle();
        Ok(*slot)
    }

    pub fn set(&mut self, index: usize, state: S) -> Result<()> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or(EngineError::BoxOutOfRange { index, len })?;
        *slot = state;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.0.fill(S::default());
    }
}

impl DamageTrack {
    /// Fill undamaged boxes left to right. With no undamaged box left,
    /// superficial damage upgrades the first superficial box instead.
    /// Returns the number of boxes that changed.
    pub fn apply_damage(&mut self, kind: DamageKind, amount: usize) -> usize {
        let mut changed = 0;
        for _ in 0..amount {
            let target = match kind {
                DamageKind::Superficial => DamageState::Superficial,
                DamageKind::Aggravated => DamageState::Aggravated,
            };
            if let Some(slot) = self.0.iter_mut().find(|s| **s == DamageState::Ok) {
                *slot = target;
            } else if let Some(slot) = self.0.iter_mut().find(|s| **s == DamageState::Superficial) {
                *slot = DamageState::Aggravated;
            } else {
                break;
            }
            changed += 1;
        }
        changed
    }

    /// Clear up to `amount` superficial boxes, rightmost first.
    pub fn mend_superficial(&mut self, amount: usize) -> usize {
        let mut mended = 0;
        for slot in self.0.iter_mut().rev() {
            if mended == amount {
                break;
            }
            if *slot == DamageState::Superficial {
                *slot = DamageState::Ok;
                mended += 1;
            }
        }
        mended
    }

    /// Every box carries damage.
    pub fn is_filled(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|s| *s != DamageState::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_reports_dropped_marks() {
        let mut t = DamageTrack::new(5);
        t.set(4, DamageState::Aggravated).unwrap();
        t.set(0, DamageState::Superficial).unwrap();
        let r = t.resize(3);
        assert_eq!(r.dropped_marks, 1);
        assert_eq!(t.boxes(), &[DamageState::Superficial, DamageState::Ok, DamageState::Ok]);
    }

    #[test]
    fn superficial_overflow_upgrades_to_aggravated() {
        let mut t = DamageTrack::new(3);
        assert_eq!(t.apply_damage(DamageKind::Superficial, 4), 4);
        assert_eq!(t.count(DamageState::Aggravated), 1);
        assert_eq!(t.count(DamageState::Superficial), 2);
        assert!(t.is_filled());

        t.apply_damage(DamageKind::Aggravated, 5);
        assert_eq!(t.count(DamageState::Aggravated), 3);
        assert_eq!(t.apply_damage(DamageKind::Superficial, 1), 0);
    }

    #[test]
    fn mending_clears_superficial_from_the_right() {
        let mut t = DamageTrack::new(4);
        t.apply_damage(DamageKind::Aggravated, 1);
        t.apply_damage(DamageKind::Superficial, 2);
        assert_eq!(t.mend_superficial(1), 1);
        assert_eq!(
            t.boxes(),
            &[DamageState::Aggravated, DamageState::Superficial, DamageState::Ok, DamageState::Ok]
        );
    }

    #[test]
    fn cycle_out_of_range_is_an_error() {
        let mut t = MarkTrack::new(2);
        assert!(matches!(
            t.cycle(2),
            Err(EngineError::BoxOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(t.cycle(1).unwrap(), MarkState::Checked);
        assert_eq!(t.cycle(1).unwrap(), MarkState::Stained);
        assert_eq!(t.cycle(1).unwrap(), MarkState::Unchecked);
    }
}
