use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::catalog::Medicine;
use crate::errors::{Error, Field};

use super::table::PrescriptionLine;

/// Free-text dosing fields of the order form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct LineInput {
    pub dose: String,
    pub interval: String,
    pub duration: String,
    pub instruction: String,
}

impl LineInput {
    /// Overwrites one text field; `Field::Medicine` is a selector and is ignored.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Dose => &mut self.dose,
            Field::Interval => &mut self.interval,
            Field::Duration => &mut self.duration,
            Field::Instruction => &mut self.instruction,
            Field::Medicine => return,
        };
        *slot = value.into();
    }

    /// Checks every field for a value and builds the line to append.
    ///
    /// The returned line is unlabelled (`sequence_label == 0`); the table assigns the label on
    /// insertion. Duration must be present but is not carried onto the line.
    pub fn assemble(&self, medicine: Option<&Medicine>) -> Result<PrescriptionLine, Error> {
        let mut missing = Vec::new();
        if medicine.is_none() {
            missing.push(Field::Medicine);
        }
        for (field, value) in [
            (Field::Dose, &self.dose),
            (Field::Interval, &self.interval),
            (Field::Duration, &self.duration),
            (Field::Instruction, &self.instruction),
        ] {
            if value.is_empty() {
                missing.push(field);
            }
        }

        match medicine {
            Some(medicine) if missing.is_empty() => Ok(PrescriptionLine {
                sequence_label: 0,
                medicine_name: medicine.name.clone(),
                dose: self.dose.clone(),
                interval: self.interval.clone(),
                instruction: self.instruction.clone(),
            }),
            _ => Err(Error::Validation { missing }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paracetamol() -> Medicine {
        Medicine::new(9.into(), "Paracetamol".into(), 1.into())
    }

    fn filled() -> LineInput {
        LineInput::new(
            "500mg".into(),
            "8h".into(),
            "5d".into(),
            "after meals".into(),
        )
    }

    #[test]
    fn complete_form_builds_line_without_duration() {
        let line = filled().assemble(Some(&paracetamol())).unwrap();
        assert_eq!(
            line,
            PrescriptionLine {
                sequence_label: 0,
                medicine_name: "Paracetamol".into(),
                dose: "500mg".into(),
                interval: "8h".into(),
                instruction: "after meals".into(),
            }
        );
    }

    #[test]
    fn each_missing_field_is_reported() {
        for field in [
            Field::Dose,
            Field::Interval,
            Field::Duration,
            Field::Instruction,
        ] {
            let mut input = filled();
            input.set(field, "");
            assert_eq!(
                input.assemble(Some(&paracetamol())),
                Err(Error::Validation {
                    missing: vec![field]
                })
            );
        }
    }

    #[test]
    fn missing_medicine_and_empty_fields_are_listed_in_form_order() {
        let input = LineInput {
            dose: String::new(),
            instruction: String::new(),
            ..filled()
        };
        assert_eq!(
            input.assemble(None),
            Err(Error::Validation {
                missing: vec![Field::Medicine, Field::Dose, Field::Instruction]
            })
        );
    }

    #[test]
    fn whitespace_counts_as_a_value() {
        let input = LineInput {
            dose: " ".into(),
            ..filled()
        };
        let line = input.assemble(Some(&paracetamol())).unwrap();
        assert_eq!(line.dose, " ");
    }
}
