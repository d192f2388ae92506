use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use cqrs_es::{Aggregate, EventEnvelope, View as CqrsView};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use ulid::Ulid;

use crate::catalog::{Catalog, CatalogError, CatalogId, DrugClass, Medicine};
use crate::errors::Error;

use super::commands::FetchOutcome;
use super::inputs::LineInput;
use super::table::RowId;
use super::view::FormView;
use super::{Command, Event, OrderForm, Services};

/// A finished catalog fetch, tagged with the generation it was issued for.
#[derive(Debug)]
pub enum Completion {
    Classes {
        generation: u64,
        result: Result<Vec<DrugClass>, CatalogError>,
    },
    Medicines {
        class_id: CatalogId,
        generation: u64,
        result: Result<Vec<Medicine>, CatalogError>,
    },
}

/// Owner of one order form.
///
/// User operations are applied immediately, in call order. Catalog fetches run as spawned
/// tasks and come back through [`PrescriptionPad::next_completion`]; responses that no longer
/// match the current selection are dropped by the form.
pub struct PrescriptionPad<C> {
    id: String,
    form: OrderForm,
    view: FormView,
    services: Services,
    catalog: Arc<C>,
    sequence: usize,
    in_flight: usize,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl<C: Catalog + 'static> PrescriptionPad<C> {
    pub fn new(catalog: Arc<C>, services: Services) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            id: Ulid::new().to_string(),
            form: OrderForm::default(),
            view: FormView::default(),
            services,
            catalog,
            sequence: 0,
            in_flight: 0,
            completions_tx,
            completions_rx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn form(&self) -> &OrderForm {
        &self.form
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    /// Number of fetches issued and not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Handles a command against the current form and applies the resulting events.
    pub async fn execute(&mut self, command: Command) -> Result<Vec<Event>, Error> {
        let events = self.form.handle(command, &self.services).await?;

        let metadata = HashMap::from([("command_id".to_string(), Ulid::new().to_string())]);
        for event in &events {
            self.sequence += 1;
            self.form.apply(event.clone());
            self.view.update(&EventEnvelope {
                aggregate_id: self.id.clone(),
                sequence: self.sequence,
                payload: event.clone(),
                metadata: metadata.clone(),
            });
        }

        Ok(events)
    }

    /// Requests the class list. Any earlier class request still in flight becomes stale.
    pub async fn load_classes(&mut self) -> Result<(), Error> {
        for event in self.execute(Command::RequestClasses).await? {
            if let Event::ClassesRequested { generation } = event {
                self.spawn_classes(generation);
            }
        }
        Ok(())
    }

    /// Changes the class selector. A blank selection issues no fetch.
    pub async fn choose_class(&mut self, class_id: Option<CatalogId>) -> Result<(), Error> {
        for event in self.execute(Command::ChooseClass { class_id }).await? {
            match event {
                Event::ClassChosen {
                    class_id,
                    generation,
                } => {
                    tracing::info!("Selected class {}", class_id);
                    self.spawn_medicines(class_id, generation);
                }
                Event::ClassCleared { .. } => tracing::info!("Class selection cleared"),
                _ => {}
            }
        }
        Ok(())
    }

    pub async fn choose_medicine(&mut self, medicine_id: Option<CatalogId>) -> Result<(), Error> {
        self.execute(Command::ChooseMedicine { medicine_id }).await?;
        Ok(())
    }

    /// Validates the form and appends a line for the selected medicine.
    pub async fn add_line(&mut self, input: LineInput) -> Result<RowId, Error> {
        let row_id = RowId::generate();
        self.execute(Command::AddLine {
            row_id: row_id.clone(),
            input,
        })
        .await?;

        tracing::info!("Added row {} ({} rows)", row_id, self.form.table.len());
        Ok(row_id)
    }

    /// Returns whether a row was removed; unknown rows are ignored.
    pub async fn remove_line(&mut self, row_id: &RowId) -> Result<bool, Error> {
        let events = self
            .execute(Command::RemoveLine {
                row_id: row_id.clone(),
            })
            .await?;

        if !events.is_empty() {
            tracing::info!("Removed row {} ({} rows)", row_id, self.form.table.len());
        }
        Ok(!events.is_empty())
    }

    pub async fn toggle_notes(&mut self) -> Result<bool, Error> {
        self.execute(Command::ToggleNotePad).await?;
        Ok(self.form.notes.is_visible())
    }

    pub async fn edit_note(&mut self, text: impl Into<String>) -> Result<(), Error> {
        self.execute(Command::EditNote { text: text.into() }).await?;
        Ok(())
    }

    /// Saves the current draft; on failure the panel and draft are left as they were.
    pub async fn save_note(&mut self) -> Result<(), Error> {
        self.execute(Command::SaveNote).await?;
        Ok(())
    }

    /// Waits for the next fetch to finish.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Feeds a finished fetch back into the form.
    pub async fn apply_completion(&mut self, completion: Completion) -> Result<Vec<Event>, Error> {
        self.in_flight = self.in_flight.saturating_sub(1);

        let command = match completion {
            Completion::Classes { generation, result } => Command::ReceiveClasses {
                generation,
                outcome: outcome("classes", result),
            },
            Completion::Medicines {
                class_id,
                generation,
                result,
            } => Command::ReceiveMedicines {
                class_id,
                generation,
                outcome: outcome("medicine names", result),
            },
        };

        self.execute(command).await
    }

    /// Applies completions until no fetch is in flight.
    pub async fn settle(&mut self) -> Result<(), Error> {
        while self.in_flight > 0 {
            match self.next_completion().await {
                Some(completion) => {
                    self.apply_completion(completion).await?;
                }
                None => break,
            }
        }
        Ok(())
    }

    fn spawn_classes(&mut self, generation: u64) {
        tracing::debug!("Requesting classes (generation {})", generation);

        let catalog = Arc::clone(&self.catalog);
        self.spawn_fetch(
            async move { catalog.list_classes().await },
            move |result| Completion::Classes { generation, result },
        );
    }

    fn spawn_medicines(&mut self, class_id: CatalogId, generation: u64) {
        tracing::debug!(
            "Requesting medicines for class {} (generation {})",
            class_id,
            generation
        );

        let catalog = Arc::clone(&self.catalog);
        let requested = class_id.clone();
        self.spawn_fetch(
            async move { catalog.list_medicines(&requested).await },
            move |result| Completion::Medicines {
                class_id,
                generation,
                result,
            },
        );
    }

    /// Runs a fetch in its own task. A fetch that panics or is cancelled still reports a
    /// completion, so `in_flight` always drains.
    fn spawn_fetch<T, F, K>(&mut self, fetch: F, complete: K)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, CatalogError>> + Send + 'static,
        K: FnOnce(Result<T, CatalogError>) -> Completion + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = match tokio::spawn(fetch).await {
                Ok(result) => result,
                Err(err) => Err(CatalogError::Aborted(err)),
            };
            let _ = tx.send(complete(result));
        });
    }
}

fn outcome<T>(what: &str, result: Result<Vec<T>, CatalogError>) -> FetchOutcome<T> {
    match result {
        Ok(items) => FetchOutcome::Loaded(items),
        Err(err) => {
            tracing::warn!("Error fetching {}: {}", what, err);
            FetchOutcome::Unavailable {
                reason: Error::from(err).to_string(),
            }
        }
    }
}
