//! Upload sequencing and the page state it owns.

pub mod state;
pub mod upload;

pub use state::PageState;
pub use upload::{StatsRequest, SubmitRequest, Ticket, UploadPhase, UploadWorkflow};
