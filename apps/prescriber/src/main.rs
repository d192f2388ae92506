use std::sync::Arc;

use prescribing::catalog::{CatalogConfig, HttpCatalog};
use prescribing::orders::{LineInput, PrescriptionPad, Services};
use tokio::io::{AsyncBufReadExt, BufReader};

mod input;

use input::{UiEvent, HELP};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = CatalogConfig::from_env();
    tracing::info!("Using catalog at {}", config.base_url());

    let catalog = Arc::new(HttpCatalog::new(config)?);
    let mut pad = PrescriptionPad::new(catalog, Services::default());
    let mut fields = LineInput::default();

    pad.load_classes().await?;
    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                let event = match line.parse::<UiEvent>() {
                    Ok(event) => event,
                    Err(message) => {
                        println!("{}", message);
                        continue;
                    }
                };

                if event == UiEvent::Quit {
                    break;
                }

                if let Err(e) = handle(&mut pad, &mut fields, event).await {
                    println!("{}", e);
                }
                println!("{}\n", pad.view());
            }

            Some(completion) = pad.next_completion() => {
                pad.apply_completion(completion).await?;
                println!("{}\n", pad.view());
            }
        }
    }

    Ok(())
}

async fn handle(
    pad: &mut PrescriptionPad<HttpCatalog>,
    fields: &mut LineInput,
    event: UiEvent,
) -> Result<(), prescribing::Error> {
    match event {
        UiEvent::LoadClasses => pad.load_classes().await,
        UiEvent::ChooseClass(class_id) => pad.choose_class(class_id).await,
        UiEvent::ChooseMedicine(medicine_id) => pad.choose_medicine(medicine_id).await,
        UiEvent::SetField(field, value) => {
            fields.set(field, value);
            Ok(())
        }
        UiEvent::Add => pad.add_line(fields.clone()).await.map(|_| ()),
        UiEvent::Remove(position) => {
            let row_id = pad
                .view()
                .rows()
                .get(position - 1)
                .map(|row| row.row_id.clone());
            match row_id {
                Some(row_id) => pad.remove_line(&row_id).await.map(|_| ()),
                None => {
                    println!("No row at position {}", position);
                    Ok(())
                }
            }
        }
        UiEvent::ToggleNotes => pad.toggle_notes().await.map(|_| ()),
        UiEvent::EditNote(text) => pad.edit_note(text).await,
        UiEvent::SaveNote => pad.save_note().await,
        UiEvent::Show => Ok(()),
        UiEvent::Help => {
            println!("{}", HELP);
            Ok(())
        }
        UiEvent::Quit => Ok(()),
    }
}
