//! The five request-driven features of the assistant.

pub mod ask;
pub mod moc;
pub mod mover;
pub mod search;
pub mod tagging;

use client_core::ApiError;

use crate::ui::document::{Document, NodeId};

pub use ask::AskFeature;
pub use moc::MocFeature;
pub use mover::MoveFeature;
pub use search::SearchFeature;
pub use tagging::TagFeature;

pub const ERROR_CLASS: &str = "error-message";

pub fn error_text(error: &ApiError) -> String {
    format!("An error occurred: {}", error.message())
}

/// Trimmed value of a text control, `None` when blank.
fn required_value(doc: &Document, node: NodeId) -> Option<String> {
    let value = doc.value(node).trim();
    (!value.is_empty()).then(|| value.to_string())
}
