use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PanelState {
    #[default]
    Hidden,
    Visible,
}

/// A committed free-text clinical action.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct ActionNote {
    pub text: String,
    pub saved_at: DateTime<Utc>,
}

/// Collaborator that receives saved action notes.
#[async_trait]
pub trait NoteSink: Send + Sync {
    async fn record(&self, note: &ActionNote);
}

/// Default sink: notes are written to the log.
#[derive(Clone, Debug, Default)]
pub struct LogNoteSink;

#[async_trait]
impl NoteSink for LogNoteSink {
    async fn record(&self, note: &ActionNote) {
        tracing::info!("Action saved: {}", note.text);
    }
}

/// Collapsible panel with a single pending note.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ActionNotePad {
    state: PanelState,
    draft: String,
}

impl ActionNotePad {
    /// Visibility after a toggle. The draft plays no part.
    pub fn toggled(&self) -> PanelState {
        match self.state {
            PanelState::Hidden => PanelState::Visible,
            PanelState::Visible => PanelState::Hidden,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.state = if visible {
            PanelState::Visible
        } else {
            PanelState::Hidden
        };
    }

    pub fn edit(&mut self, text: String) {
        self.draft = text;
    }

    /// Builds the note to commit, leaving the pad untouched.
    pub fn prepare(&self, saved_at: DateTime<Utc>) -> Result<ActionNote, Error> {
        self.require_visible("saved")?;
        if self.draft.is_empty() {
            return Err(Error::EmptyNote);
        }
        Ok(ActionNote {
            text: self.draft.clone(),
            saved_at,
        })
    }

    /// Clears the draft and hides the panel once a note has been committed.
    pub fn commit(&mut self) {
        self.draft.clear();
        self.state = PanelState::Hidden;
    }

    pub(crate) fn require_visible(&self, to: &str) -> Result<(), Error> {
        if self.state == PanelState::Hidden {
            return Err(Error::InvalidStateTransition {
                from: "hidden".to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == PanelState::Visible
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }
}
