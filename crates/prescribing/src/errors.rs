use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Form fields checked before a line is appended, in form order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Medicine,
    Dose,
    Interval,
    Duration,
    Instruction,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Medicine => "medicine",
            Field::Dose => "dose",
            Field::Interval => "interval",
            Field::Duration => "duration",
            Field::Instruction => "instruction",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("Catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    #[error("Please fill in all fields before adding a drug (missing: {})", join(.missing))]
    Validation { missing: Vec<Field> },

    #[error("Please enter an action before saving")]
    EmptyNote,

    #[error("Entity not found: {entity}")]
    NotFound { entity: String },

    #[error("Uniqueness conflict: {field}")]
    Uniqueness { field: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

fn join(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
