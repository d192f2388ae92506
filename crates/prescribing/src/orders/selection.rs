use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogId;

/// Cascade status of the class and medicine selectors.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    /// No class chosen
    #[default]
    Idle,
    /// Class chosen, medicines loading or loaded
    ClassChosen,
    /// Medicine chosen, ready to add a line
    MedicineChosen,
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormStatus::Idle => "idle",
            FormStatus::ClassChosen => "class_chosen",
            FormStatus::MedicineChosen => "medicine_chosen",
        };
        f.write_str(name)
    }
}

/// Current selector values. A medicine selection is cleared whenever the class changes.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct SelectionState {
    pub selected_class: Option<CatalogId>,
    pub selected_medicine: Option<CatalogId>,
}

/// Contents of a dependent selector.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OptionList<T> {
    /// Nothing requested yet (for medicines: no class chosen)
    Unrequested,
    Loading,
    Loaded { items: Vec<T> },
    /// The catalog answered with no entries
    Empty,
    Unavailable { reason: String },
}

impl<T> Default for OptionList<T> {
    fn default() -> Self {
        Self::Unrequested
    }
}

impl<T> OptionList<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Loaded { items }
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Loaded { items } => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
