use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogId, DrugClass, Medicine};

use super::inputs::LineInput;
use super::table::RowId;

/// Result of a catalog fetch as fed back into the form.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum FetchOutcome<T> {
    Loaded(Vec<T>),
    Unavailable { reason: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum Command {
    /// Ask for the class list (issues a fetch)
    RequestClasses,

    /// Class fetch finished
    ReceiveClasses {
        generation: u64,
        outcome: FetchOutcome<DrugClass>,
    },

    /// Class selector changed; `None` is the blank option
    ChooseClass {
        class_id: Option<CatalogId>,
    },

    /// Medicine fetch finished
    ReceiveMedicines {
        class_id: CatalogId,
        generation: u64,
        outcome: FetchOutcome<Medicine>,
    },

    /// Medicine selector changed; `None` is the blank option
    ChooseMedicine {
        medicine_id: Option<CatalogId>,
    },

    /// Add button pressed
    AddLine {
        row_id: RowId,
        input: LineInput,
    },

    /// Remove button pressed on a row
    RemoveLine {
        row_id: RowId,
    },

    /// Show or hide the action panel
    ToggleNotePad,

    /// Action input changed
    EditNote {
        text: String,
    },

    /// Save button pressed on the action panel
    SaveNote,
}
