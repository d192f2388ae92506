use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Removal reference for a table row.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct RowId(String);

impl RowId {
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One prescribed drug. Duration is collected by the form but not carried here.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct PrescriptionLine {
    pub sequence_label: u32,
    pub medicine_name: String,
    pub dose: String,
    pub interval: String,
    pub instruction: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct OrderRow {
    pub row_id: RowId,
    pub line: PrescriptionLine,
}

/// Ordered prescription lines.
///
/// Labels are assigned once, at insertion, as the row count plus one. They are not renumbered
/// after a removal, so a label can repeat once earlier rows are gone.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct OrderTable {
    rows: Vec<OrderRow>,
}

impl OrderTable {
    pub fn next_label(&self) -> u32 {
        self.rows.len() as u32 + 1
    }

    pub fn append(&mut self, row_id: RowId, mut line: PrescriptionLine) -> &OrderRow {
        line.sequence_label = self.next_label();
        self.rows.push(OrderRow { row_id, line });
        &self.rows[self.rows.len() - 1]
    }

    /// Unknown references are ignored.
    pub fn remove(&mut self, row_id: &RowId) -> Option<OrderRow> {
        let index = self.rows.iter().position(|row| &row.row_id == row_id)?;
        Some(self.rows.remove(index))
    }

    pub fn contains(&self, row_id: &RowId) -> bool {
        self.rows.iter().any(|row| &row.row_id == row_id)
    }

    pub fn rows(&self) -> &[OrderRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The empty-state row is shown exactly when there are no rows.
    pub fn shows_empty_state(&self) -> bool {
        self.rows.is_empty()
    }
}
