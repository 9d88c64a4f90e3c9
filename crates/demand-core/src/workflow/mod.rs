//! Demand submission workflow.
//!
//! A submission validates the form, creates the card, then uploads each
//! attachment strictly in order. Progress is published on a watch channel as
//! a sequence of pure [`SubmissionProgress::apply`] transitions.

mod pipeline;
mod progress;
mod session;

pub use pipeline::{AttachmentFailure, SubmissionReport};
pub use progress::{FileProgress, Phase, ProgressEvent, SubmissionProgress};
pub use session::{DemandSession, RESET_DELAY};
