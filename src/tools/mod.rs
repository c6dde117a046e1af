//! Tools the model may invoke on an email.

pub mod action;
pub mod catalog;

pub use action::EmailAction;
pub use catalog::{ADD_TAGS, ARCHIVE_EMAIL, DRAFT_RESPONSE, ToolCatalog};
