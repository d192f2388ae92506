use chrono::{DateTime, Utc};
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogId, DrugClass, Medicine};

use super::table::{PrescriptionLine, RowId};

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    ClassesRequested {
        generation: u64,
    },

    ClassesLoaded {
        generation: u64,
        classes: Vec<DrugClass>,
    },

    ClassesUnavailable {
        generation: u64,
        reason: String,
    },

    ClassChosen {
        class_id: CatalogId,
        generation: u64,
    },

    ClassCleared {
        generation: u64,
    },

    MedicinesLoaded {
        class_id: CatalogId,
        medicines: Vec<Medicine>,
    },

    MedicinesUnavailable {
        class_id: CatalogId,
        reason: String,
    },

    MedicineChosen {
        medicine_id: Option<CatalogId>,
    },

    LineAppended {
        row_id: RowId,
        line: PrescriptionLine,
    },

    LineRemoved {
        row_id: RowId,
    },

    NotePadToggled {
        visible: bool,
    },

    NoteEdited {
        text: String,
    },

    NoteSaved {
        text: String,
        saved_at: DateTime<Utc>,
    },
}

impl DomainEvent for Event {
    fn event_type(&self) -> String {
        match self {
            Event::ClassesRequested { .. } => "Order:ClassesRequested".to_string(),
            Event::ClassesLoaded { .. } => "Order:ClassesLoaded".to_string(),
            Event::ClassesUnavailable { .. } => "Order:ClassesUnavailable".to_string(),
            Event::ClassChosen { .. } => "Order:ClassChosen".to_string(),
            Event::ClassCleared { .. } => "Order:ClassCleared".to_string(),
            Event::MedicinesLoaded { .. } => "Order:MedicinesLoaded".to_string(),
            Event::MedicinesUnavailable { .. } => "Order:MedicinesUnavailable".to_string(),
            Event::MedicineChosen { .. } => "Order:MedicineChosen".to_string(),
            Event::LineAppended { .. } => "Order:LineAppended".to_string(),
            Event::LineRemoved { .. } => "Order:LineRemoved".to_string(),
            Event::NotePadToggled { .. } => "Order:NotePadToggled".to_string(),
            Event::NoteEdited { .. } => "Order:NoteEdited".to_string(),
            Event::NoteSaved { .. } => "Order:NoteSaved".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1.0".to_string()
    }
}
