/// Order form aggregate
pub mod aggregate;

/// Commands
pub mod commands;

/// Events
pub mod events;

/// Form fields and line assembly
pub mod inputs;

/// Class and medicine selectors
pub mod selection;

/// Prescription table
pub mod table;

/// Action note panel
pub mod notes;

/// View (display projection)
pub mod view;

/// Event loop owner
pub mod pad;

pub use aggregate::{OrderForm, Services, AGGREGATE_TYPE};
pub use commands::{Command, FetchOutcome};
pub use events::Event;
pub use inputs::LineInput;
pub use notes::{ActionNote, ActionNotePad, LogNoteSink, NoteSink, PanelState};
pub use pad::{Completion, PrescriptionPad};
pub use selection::{FormStatus, OptionList, SelectionState};
pub use table::{OrderRow, OrderTable, PrescriptionLine, RowId};
pub use view::{FormView, SelectOption};
