use tracing::debug;

use crate::character::{ChangeLogEntry, Character};
use crate::diff::{diff, summarize};
use crate::error::Result;
use crate::roster::{Persistence, Roster};

/// An edit in progress. Only the draft is mutable; the snapshot taken at
/// the start is what the draft is compared against on commit.
#[derive(Debug, Clone)]
pub struct EditSession {
    original: Character,
    draft: Character,
}

impl EditSession {
    pub fn begin(character: &Character) -> Self {
        Self {
            original: character.clone(),
            draft: character.clone(),
        }
    }

    pub fn original(&self) -> &Character {
        &self.original
    }

    pub fn draft(&self) -> &Character {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Character {
        &mut self.draft
    }

    /// Lines the commit would log.
    pub fn pending_changes(&self) -> Result<Vec<String>> {
        diff(&self.original, &self.draft)
    }

    /// Fold the draft into a change log entry (when anything changed) and
    /// return the character that should become canonical.
    pub fn finish(self) -> Result<(Character, Option<ChangeLogEntry>)> {
        let lines = diff(&self.original, &self.draft)?;
        let mut draft = self.draft;
        let entry = summarize(&lines).map(|summary| draft.log(summary).clone());
        debug!(id = %draft.id(), changes = lines.len(), "edit finished");
        Ok((draft, entry))
    }

    /// Diff, log, and replace the canonical character in `roster`.
    pub fn commit<P: Persistence>(self, roster: &mut Roster<P>) -> Result<Option<ChangeLogEntry>> {
        let (draft, entry) = self.finish()?;
        roster.update(draft)?;
        Ok(entry)
    }

    pub fn cancel(self) {
        debug!(id = %self.original.id(), "edit cancelled");
    }
}

/// Start editing a copy of `character`.
pub fn begin_edit(character: &Character) -> EditSession {
    EditSession::begin(character)
}
