//! Data models for Demand Desk

mod attachment;
mod form;

pub use attachment::{Attachment, AttachmentSet, MAX_ATTACHMENTS, MAX_ATTACHMENT_BYTES};
pub use form::{local_midnight_utc, parse_deadline, Category, FormState, Priority};
