//! demand-core - Core library for Demand Desk
//!
//! This crate contains the demand form model, the credential configuration
//! store, the Trello REST client and the submission workflow used by the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod trello;
pub mod util;
pub mod workflow;

pub use error::{Error, Result, ValidationError};
pub use models::{Attachment, AttachmentSet, FormState, Priority};
