use std::str::FromStr;

use prescribing::catalog::CatalogId;
use prescribing::Field;

pub const HELP: &str = "\
classes                      reload the class list
class <id> | class -         choose or clear the class
medicine <id> | medicine -   choose or clear the medicine
dose|interval|duration|instruction <text>
add                          add the filled line to the table
remove <n>                   remove the n-th row as displayed
notes                        show or hide the action panel
note <text>                  type into the action panel
save                         save the action
show | help | quit";

/// One user action on the form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UiEvent {
    LoadClasses,
    ChooseClass(Option<CatalogId>),
    ChooseMedicine(Option<CatalogId>),
    SetField(Field, String),
    Add,
    Remove(usize),
    ToggleNotes,
    EditNote(String),
    SaveNote,
    Show,
    Help,
    Quit,
}

impl FromStr for UiEvent {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let event = match word {
            "classes" => UiEvent::LoadClasses,
            "class" => UiEvent::ChooseClass(selector_value(rest)),
            "medicine" => UiEvent::ChooseMedicine(selector_value(rest)),
            "dose" => UiEvent::SetField(Field::Dose, rest.to_string()),
            "interval" => UiEvent::SetField(Field::Interval, rest.to_string()),
            "duration" => UiEvent::SetField(Field::Duration, rest.to_string()),
            "instruction" => UiEvent::SetField(Field::Instruction, rest.to_string()),
            "add" => UiEvent::Add,
            "remove" => {
                let position = rest
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("Invalid row position: {:?}", rest))?;
                UiEvent::Remove(position)
            }
            "notes" => UiEvent::ToggleNotes,
            "note" => UiEvent::EditNote(rest.to_string()),
            "save" => UiEvent::SaveNote,
            "show" | "" => UiEvent::Show,
            "help" => UiEvent::Help,
            "quit" | "exit" => UiEvent::Quit,
            other => return Err(format!("Unknown command: {}", other)),
        };

        Ok(event)
    }
}

fn selector_value(rest: &str) -> Option<CatalogId> {
    if rest == "-" {
        None
    } else {
        CatalogId::parse(rest)
    }
}
