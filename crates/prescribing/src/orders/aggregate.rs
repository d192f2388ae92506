use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use cqrs_es::Aggregate;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogId, DrugClass, Medicine};
use crate::errors::Error;

use super::commands::FetchOutcome;
use super::notes::{ActionNotePad, LogNoteSink, NoteSink, PanelState};
use super::selection::{FormStatus, OptionList, SelectionState};
use super::table::OrderTable;
use super::{Command, Event};

/// Order form aggregate: the whole state of one prescription page.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct OrderForm {
    pub status: FormStatus,
    pub selection: SelectionState,

    // Selector contents
    pub classes: OptionList<DrugClass>,
    pub medicines: OptionList<Medicine>,

    // Generation of the latest fetch issued for each selector
    pub class_generation: u64,
    pub medicine_generation: u64,

    pub table: OrderTable,
    pub notes: ActionNotePad,
}

pub const AGGREGATE_TYPE: &str = "OrderForm";

#[derive(Clone)]
pub struct Services {
    pub notes: Arc<dyn NoteSink>,
}

impl Services {
    pub fn new(notes: Arc<dyn NoteSink>) -> Self {
        Self { notes }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(Arc::new(LogNoteSink))
    }
}

#[async_trait]
impl Aggregate for OrderForm {
    type Command = Command;
    type Event = Event;
    type Error = Error;
    type Services = Services;

    fn aggregate_type() -> String {
        AGGREGATE_TYPE.to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            Command::RequestClasses => Ok(vec![Event::ClassesRequested {
                generation: self.class_generation + 1,
            }]),

            Command::ReceiveClasses { generation, outcome } => {
                if generation != self.class_generation || !self.classes.is_loading() {
                    tracing::debug!("Discarding stale class list (generation {})", generation);
                    return Ok(vec![]);
                }

                Ok(vec![match outcome {
                    FetchOutcome::Loaded(classes) => Event::ClassesLoaded { generation, classes },
                    FetchOutcome::Unavailable { reason } => {
                        Event::ClassesUnavailable { generation, reason }
                    }
                }])
            }

            Command::ChooseClass { class_id: None } => Ok(vec![Event::ClassCleared {
                generation: self.medicine_generation + 1,
            }]),

            Command::ChooseClass {
                class_id: Some(class_id),
            } => Ok(vec![Event::ClassChosen {
                class_id,
                generation: self.medicine_generation + 1,
            }]),

            Command::ReceiveMedicines {
                class_id,
                generation,
                outcome,
            } => {
                if !self.is_current_medicine_fetch(&class_id, generation) {
                    tracing::debug!(
                        "Discarding stale medicine list for class {} (generation {})",
                        class_id,
                        generation
                    );
                    return Ok(vec![]);
                }

                Ok(vec![match outcome {
                    FetchOutcome::Loaded(medicines) => Event::MedicinesLoaded {
                        class_id,
                        medicines,
                    },
                    FetchOutcome::Unavailable { reason } => {
                        Event::MedicinesUnavailable { class_id, reason }
                    }
                }])
            }

            Command::ChooseMedicine { medicine_id: None } => {
                if self.status == FormStatus::Idle {
                    return Ok(vec![]);
                }
                Ok(vec![Event::MedicineChosen { medicine_id: None }])
            }

            Command::ChooseMedicine {
                medicine_id: Some(medicine_id),
            } => {
                self.validate_class_chosen(FormStatus::MedicineChosen)?;
                if self.find_medicine(&medicine_id).is_none() {
                    return Err(Error::NotFound {
                        entity: "Medicine".to_string(),
                    });
                }

                Ok(vec![Event::MedicineChosen {
                    medicine_id: Some(medicine_id),
                }])
            }

            Command::AddLine { row_id, input } => {
                if self.table.contains(&row_id) {
                    return Err(Error::Uniqueness {
                        field: "row_id".to_string(),
                    });
                }

                let mut line = input.assemble(self.selected_medicine())?;
                line.sequence_label = self.table.next_label();

                Ok(vec![Event::LineAppended { row_id, line }])
            }

            Command::RemoveLine { row_id } => {
                if !self.table.contains(&row_id) {
                    tracing::debug!("Ignoring removal of unknown row {}", row_id);
                    return Ok(vec![]);
                }
                Ok(vec![Event::LineRemoved { row_id }])
            }

            Command::ToggleNotePad => Ok(vec![Event::NotePadToggled {
                visible: self.notes.toggled() == PanelState::Visible,
            }]),

            Command::EditNote { text } => {
                self.notes.require_visible("editing")?;
                Ok(vec![Event::NoteEdited { text }])
            }

            Command::SaveNote => {
                let note = self.notes.prepare(Utc::now())?;
                services.notes.record(&note).await;

                Ok(vec![Event::NoteSaved {
                    text: note.text,
                    saved_at: note.saved_at,
                }])
            }
        }
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            Event::ClassesRequested { generation } => {
                self.classes = OptionList::Loading;
                self.class_generation = generation;
            }

            Event::ClassesLoaded { classes, .. } => {
                self.classes = OptionList::from_items(classes);
            }

            Event::ClassesUnavailable { reason, .. } => {
                self.classes = OptionList::Unavailable { reason };
            }

            Event::ClassChosen {
                class_id,
                generation,
            } => {
                self.selection.selected_class = Some(class_id);
                self.selection.selected_medicine = None;
                self.medicines = OptionList::Loading;
                self.medicine_generation = generation;
                self.status = FormStatus::ClassChosen;
            }

            Event::ClassCleared { generation } => {
                self.selection = SelectionState::default();
                self.medicines = OptionList::Unrequested;
                self.medicine_generation = generation;
                self.status = FormStatus::Idle;
            }

            Event::MedicinesLoaded { medicines, .. } => {
                self.medicines = OptionList::from_items(medicines);
            }

            Event::MedicinesUnavailable { reason, .. } => {
                self.medicines = OptionList::Unavailable { reason };
            }

            Event::MedicineChosen { medicine_id } => {
                self.status = if medicine_id.is_some() {
                    FormStatus::MedicineChosen
                } else {
                    FormStatus::ClassChosen
                };
                self.selection.selected_medicine = medicine_id;
            }

            Event::LineAppended { row_id, line } => {
                self.table.append(row_id, line);
            }

            Event::LineRemoved { row_id } => {
                self.table.remove(&row_id);
            }

            Event::NotePadToggled { visible } => {
                self.notes.set_visible(visible);
            }

            Event::NoteEdited { text } => {
                self.notes.edit(text);
            }

            Event::NoteSaved { .. } => {
                self.notes.commit();
            }
        }
    }
}

impl OrderForm {
    /// The selected medicine, resolved against the loaded list.
    pub fn selected_medicine(&self) -> Option<&Medicine> {
        self.selection
            .selected_medicine
            .as_ref()
            .and_then(|id| self.find_medicine(id))
    }

    fn find_medicine(&self, medicine_id: &CatalogId) -> Option<&Medicine> {
        self.medicines
            .items()
            .iter()
            .find(|medicine| &medicine.id == medicine_id)
    }

    fn is_current_medicine_fetch(&self, class_id: &CatalogId, generation: u64) -> bool {
        generation == self.medicine_generation
            && self.selection.selected_class.as_ref() == Some(class_id)
            && self.medicines.is_loading()
    }

    fn validate_class_chosen(&self, to: FormStatus) -> Result<(), Error> {
        if self.status == FormStatus::Idle {
            return Err(Error::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cqrs_es::test::TestFramework;

    use super::*;
    use crate::errors::Field;
    use crate::orders::inputs::LineInput;
    use crate::orders::notes::ActionNote;
    use crate::orders::table::{PrescriptionLine, RowId};

    type OrderFormTestFramework = TestFramework<OrderForm>;

    fn framework() -> OrderFormTestFramework {
        TestFramework::with(Services::default())
    }

    fn paracetamol() -> Medicine {
        Medicine::new(9.into(), "Paracetamol".into(), 1.into())
    }

    fn class_one_loaded() -> Vec<Event> {
        vec![
            Event::ClassChosen {
                class_id: 1.into(),
                generation: 1,
            },
            Event::MedicinesLoaded {
                class_id: 1.into(),
                medicines: vec![paracetamol()],
            },
        ]
    }

    fn filled_input() -> LineInput {
        LineInput::new(
            "500mg".into(),
            "8h".into(),
            "5d".into(),
            "after meals".into(),
        )
    }

    #[test]
    fn choosing_a_class_issues_next_generation() {
        framework()
            .given(class_one_loaded())
            .when(Command::ChooseClass {
                class_id: Some(2.into()),
            })
            .then_expect_events(vec![Event::ClassChosen {
                class_id: 2.into(),
                generation: 2,
            }]);
    }

    #[test]
    fn clearing_the_class_invalidates_pending_fetch() {
        framework()
            .given(vec![Event::ClassChosen {
                class_id: 1.into(),
                generation: 1,
            }])
            .when(Command::ChooseClass { class_id: None })
            .then_expect_events(vec![Event::ClassCleared { generation: 2 }]);
    }

    #[test]
    fn medicines_for_current_class_are_applied() {
        framework()
            .given(vec![Event::ClassChosen {
                class_id: 1.into(),
                generation: 1,
            }])
            .when(Command::ReceiveMedicines {
                class_id: 1.into(),
                generation: 1,
                outcome: FetchOutcome::Loaded(vec![paracetamol()]),
            })
            .then_expect_events(vec![Event::MedicinesLoaded {
                class_id: 1.into(),
                medicines: vec![paracetamol()],
            }]);
    }

    #[test]
    fn medicines_for_superseded_class_are_discarded() {
        framework()
            .given(vec![
                Event::ClassChosen {
                    class_id: 1.into(),
                    generation: 1,
                },
                Event::ClassChosen {
                    class_id: 2.into(),
                    generation: 2,
                },
            ])
            .when(Command::ReceiveMedicines {
                class_id: 1.into(),
                generation: 1,
                outcome: FetchOutcome::Loaded(vec![paracetamol()]),
            })
            .then_expect_events(vec![]);
    }

    #[test]
    fn reselecting_same_class_discards_older_fetch() {
        framework()
            .given(vec![
                Event::ClassChosen {
                    class_id: 1.into(),
                    generation: 1,
                },
                Event::ClassChosen {
                    class_id: 1.into(),
                    generation: 2,
                },
            ])
            .when(Command::ReceiveMedicines {
                class_id: 1.into(),
                generation: 1,
                outcome: FetchOutcome::Loaded(vec![]),
            })
            .then_expect_events(vec![]);
    }

    #[test]
    fn medicines_after_clear_are_discarded() {
        framework()
            .given(vec![
                Event::ClassChosen {
                    class_id: 1.into(),
                    generation: 1,
                },
                Event::ClassCleared { generation: 2 },
            ])
            .when(Command::ReceiveMedicines {
                class_id: 1.into(),
                generation: 1,
                outcome: FetchOutcome::Loaded(vec![paracetamol()]),
            })
            .then_expect_events(vec![]);
    }

    #[test]
    fn failed_medicine_fetch_becomes_placeholder_not_error() {
        framework()
            .given(vec![Event::ClassChosen {
                class_id: 1.into(),
                generation: 1,
            }])
            .when(Command::ReceiveMedicines {
                class_id: 1.into(),
                generation: 1,
                outcome: FetchOutcome::Unavailable {
                    reason: "HTTP error! Status: 502".into(),
                },
            })
            .then_expect_events(vec![Event::MedicinesUnavailable {
                class_id: 1.into(),
                reason: "HTTP error! Status: 502".into(),
            }]);
    }

    #[test]
    fn stale_class_list_is_discarded() {
        framework()
            .given(vec![
                Event::ClassesRequested { generation: 1 },
                Event::ClassesRequested { generation: 2 },
            ])
            .when(Command::ReceiveClasses {
                generation: 1,
                outcome: FetchOutcome::Loaded(vec![DrugClass::new(1.into(), "Analgesic".into())]),
            })
            .then_expect_events(vec![]);
    }

    #[test]
    fn choosing_medicine_while_idle_is_rejected() {
        framework()
            .given_no_previous_events()
            .when(Command::ChooseMedicine {
                medicine_id: Some(9.into()),
            })
            .then_expect_error(Error::InvalidStateTransition {
                from: "idle".into(),
                to: "medicine_chosen".into(),
            });
    }

    #[test]
    fn choosing_unknown_medicine_is_rejected() {
        framework()
            .given(class_one_loaded())
            .when(Command::ChooseMedicine {
                medicine_id: Some(10.into()),
            })
            .then_expect_error_message("Entity not found: Medicine");
    }

    #[test]
    fn add_line_labels_by_current_count() {
        let mut given = class_one_loaded();
        given.push(Event::MedicineChosen {
            medicine_id: Some(9.into()),
        });
        given.push(Event::LineAppended {
            row_id: "first".into(),
            line: PrescriptionLine {
                sequence_label: 1,
                medicine_name: "Paracetamol".into(),
                dose: "1g".into(),
                interval: "6h".into(),
                instruction: "as needed".into(),
            },
        });

        framework()
            .given(given)
            .when(Command::AddLine {
                row_id: "second".into(),
                input: filled_input(),
            })
            .then_expect_events(vec![Event::LineAppended {
                row_id: "second".into(),
                line: PrescriptionLine {
                    sequence_label: 2,
                    medicine_name: "Paracetamol".into(),
                    dose: "500mg".into(),
                    interval: "8h".into(),
                    instruction: "after meals".into(),
                },
            }]);
    }

    #[test]
    fn add_line_without_medicine_is_a_validation_error() {
        framework()
            .given(class_one_loaded())
            .when(Command::AddLine {
                row_id: RowId::generate(),
                input: filled_input(),
            })
            .then_expect_error(Error::Validation {
                missing: vec![Field::Medicine],
            });
    }

    #[test]
    fn add_line_reusing_a_row_id_is_rejected() {
        let mut given = class_one_loaded();
        given.push(Event::MedicineChosen {
            medicine_id: Some(9.into()),
        });
        given.push(Event::LineAppended {
            row_id: "first".into(),
            line: PrescriptionLine {
                sequence_label: 1,
                medicine_name: "Paracetamol".into(),
                dose: "1g".into(),
                interval: "6h".into(),
                instruction: "as needed".into(),
            },
        });

        framework()
            .given(given)
            .when(Command::AddLine {
                row_id: "first".into(),
                input: filled_input(),
            })
            .then_expect_error(Error::Uniqueness {
                field: "row_id".into(),
            });
    }

    #[test]
    fn removing_unknown_row_emits_nothing() {
        framework()
            .given_no_previous_events()
            .when(Command::RemoveLine {
                row_id: "missing".into(),
            })
            .then_expect_events(vec![]);
    }

    #[test]
    fn toggle_flips_visibility() {
        framework()
            .given(vec![Event::NotePadToggled { visible: true }])
            .when(Command::ToggleNotePad)
            .then_expect_events(vec![Event::NotePadToggled { visible: false }]);
    }

    #[test]
    fn empty_note_is_rejected() {
        framework()
            .given(vec![Event::NotePadToggled { visible: true }])
            .when(Command::SaveNote)
            .then_expect_error(Error::EmptyNote);
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<ActionNote>>);

    #[async_trait]
    impl NoteSink for RecordingSink {
        async fn record(&self, note: &ActionNote) {
            self.0.lock().unwrap().push(note.clone());
        }
    }

    #[test]
    fn saved_note_is_reported_to_sink() {
        let sink = Arc::new(RecordingSink::default());
        let events = TestFramework::<OrderForm>::with(Services::new(sink.clone()))
            .given(vec![
                Event::NotePadToggled { visible: true },
                Event::NoteEdited {
                    text: "refer to physiotherapy".into(),
                },
            ])
            .when(Command::SaveNote)
            .inspect_result()
            .unwrap();

        assert!(matches!(
            events.as_slice(),
            [Event::NoteSaved { text, .. }] if text == "refer to physiotherapy"
        ));
        let recorded = sink.0.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].text, "refer to physiotherapy");
    }

    #[test]
    fn apply_keeps_medicine_selection_in_step_with_class() {
        let mut form = OrderForm::default();
        for event in class_one_loaded() {
            form.apply(event);
        }
        form.apply(Event::MedicineChosen {
            medicine_id: Some(9.into()),
        });
        assert_eq!(form.status, FormStatus::MedicineChosen);
        assert_eq!(form.selected_medicine(), Some(&paracetamol()));

        form.apply(Event::ClassChosen {
            class_id: 2.into(),
            generation: 2,
        });
        assert_eq!(form.selection.selected_medicine, None);
        assert_eq!(form.status, FormStatus::ClassChosen);
        assert!(form.medicines.is_loading());
    }
}
