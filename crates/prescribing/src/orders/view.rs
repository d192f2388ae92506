use std::fmt;

use cqrs_es::{Aggregate, EventEnvelope, View as CqrsView};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogId;

use super::selection::OptionList;
use super::table::OrderRow;
use super::{OrderForm, AGGREGATE_TYPE};

pub const SELECT_CLASS: &str = "Select medicine class";
pub const LOADING_CLASSES: &str = "Loading classes...";
pub const NO_CLASSES: &str = "No classes found";
pub const CLASSES_UNAVAILABLE: &str = "Error fetching classes";

pub const CLASS_FIRST: &str = "Select a medicine class first";
pub const LOADING_MEDICINES: &str = "Loading medicines...";
pub const SELECT_MEDICINE: &str = "Select medicine name";
pub const NO_MEDICINES: &str = "No medicines found";
pub const MEDICINES_UNAVAILABLE: &str = "Error fetching medicine names";

pub const EMPTY_TABLE: &str = "No drugs added";
pub const TABLE_COLUMNS: [&str; 5] = ["#", "Medicine", "Dose", "Interval", "Instruction"];

/// Entry of a rendered selector. Placeholders carry no value.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct SelectOption {
    pub value: Option<CatalogId>,
    pub label: String,
}

impl SelectOption {
    fn placeholder(label: &str) -> Self {
        Self {
            value: None,
            label: label.to_string(),
        }
    }

    fn item(value: &CatalogId, label: &str) -> Self {
        Self {
            value: Some(value.clone()),
            label: label.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_none()
    }
}

/// Display projection of the order form, fed with every applied event.
///
/// `form` is the display copy, rebuilt from the envelopes; the pad's own `OrderForm` stays the
/// one commands are handled against.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct FormView {
    pub aggregate_type: String,
    pub command_id: String,
    pub id: String,
    pub sequence: usize,
    pub form: OrderForm,
}

impl CqrsView<OrderForm> for FormView {
    fn update(&mut self, event: &EventEnvelope<OrderForm>) {
        self.id.clone_from(&event.aggregate_id);
        self.aggregate_type = AGGREGATE_TYPE.to_string();
        self.command_id = event
            .metadata
            .get("command_id")
            .cloned()
            .unwrap_or_default();
        self.sequence = event.sequence;
        self.form.apply(event.payload.clone());
    }
}

impl FormView {
    pub fn class_options(&self) -> Vec<SelectOption> {
        match &self.form.classes {
            OptionList::Unrequested => vec![SelectOption::placeholder(SELECT_CLASS)],
            OptionList::Loading => vec![SelectOption::placeholder(LOADING_CLASSES)],
            OptionList::Empty => vec![SelectOption::placeholder(NO_CLASSES)],
            OptionList::Unavailable { .. } => vec![SelectOption::placeholder(CLASSES_UNAVAILABLE)],
            OptionList::Loaded { items } => std::iter::once(SelectOption::placeholder(SELECT_CLASS))
                .chain(items.iter().map(|class| SelectOption::item(&class.id, &class.name)))
                .collect(),
        }
    }

    pub fn medicine_options(&self) -> Vec<SelectOption> {
        match &self.form.medicines {
            OptionList::Unrequested => vec![SelectOption::placeholder(CLASS_FIRST)],
            OptionList::Loading => vec![SelectOption::placeholder(LOADING_MEDICINES)],
            OptionList::Empty => vec![SelectOption::placeholder(NO_MEDICINES)],
            OptionList::Unavailable { .. } => {
                vec![SelectOption::placeholder(MEDICINES_UNAVAILABLE)]
            }
            OptionList::Loaded { items } => {
                std::iter::once(SelectOption::placeholder(SELECT_MEDICINE))
                    .chain(
                        items
                            .iter()
                            .map(|medicine| SelectOption::item(&medicine.id, &medicine.name)),
                    )
                    .collect()
            }
        }
    }

    pub fn rows(&self) -> &[OrderRow] {
        self.form.table.rows()
    }

    pub fn empty_row_visible(&self) -> bool {
        self.form.table.shows_empty_state()
    }

    pub fn note_panel_visible(&self) -> bool {
        self.form.notes.is_visible()
    }
}

fn write_select(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    options: &[SelectOption],
    selected: Option<&CatalogId>,
) -> fmt::Result {
    write!(f, "{:<10}", title)?;
    for option in options {
        match &option.value {
            Some(value) if Some(value) == selected => write!(f, " *{}={}", value, option.label)?,
            Some(value) => write!(f, " {}={}", value, option.label)?,
            None => write!(f, " [{}]", option.label)?,
        }
    }
    writeln!(f)
}

impl fmt::Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selection = &self.form.selection;
        write_select(
            f,
            "Class:",
            &self.class_options(),
            selection.selected_class.as_ref(),
        )?;
        write_select(
            f,
            "Medicine:",
            &self.medicine_options(),
            selection.selected_medicine.as_ref(),
        )?;

        writeln!(
            f,
            "{:<4}{:<24}{:<12}{:<12}{}",
            TABLE_COLUMNS[0], TABLE_COLUMNS[1], TABLE_COLUMNS[2], TABLE_COLUMNS[3], TABLE_COLUMNS[4]
        )?;
        if self.empty_row_visible() {
            writeln!(f, "    {}", EMPTY_TABLE)?;
        }
        for row in self.rows() {
            let line = &row.line;
            writeln!(
                f,
                "{:<4}{:<24}{:<12}{:<12}{}",
                line.sequence_label, line.medicine_name, line.dose, line.interval, line.instruction
            )?;
        }

        if self.note_panel_visible() {
            write!(f, "Action:   > {}", self.form.notes.draft())
        } else {
            write!(f, "Action:   (hidden)")
        }
    }
}
