use client_core::ApiError;
use shared::protocol::MoveResponse;

use super::{error_text, required_value};
use crate::{
    backend_bridge::commands::{BackendCommand, MoveInput},
    controller::orchestration::{Feature, InvocationToken, Regions},
    ui::{document::Document, registry::MoveElements},
};

pub const MOVE_FAILED_MARKER: &str = "Move failed";

pub struct MoveFeature {
    elements: MoveElements,
}

impl MoveFeature {
    pub fn new(elements: MoveElements) -> Self {
        Self { elements }
    }

    #[cfg(test)]
    pub fn elements(&self) -> &MoveElements {
        &self.elements
    }

    /// Shows the destination field only in manual mode.
    pub fn sync_mode(&self, doc: &mut Document) {
        let manual = doc.is_checked(self.elements.manual_mode);
        doc.set_hidden(self.elements.destination_container, !manual);
    }
}

impl Feature for MoveFeature {
    type Request = MoveInput;
    type Response = MoveResponse;

    fn name(&self) -> &'static str {
        "move"
    }

    fn regions(&self) -> Regions {
        Regions {
            loading: self.elements.loading,
            result: self.elements.result,
        }
    }

    fn validate(&self, doc: &Document) -> Option<MoveInput> {
        let source = required_value(doc, self.elements.source)?;
        let analyze = doc.is_checked(self.elements.analyze_mode);
        let destination = if analyze {
            None
        } else {
            Some(required_value(doc, self.elements.destination)?)
        };
        Some(MoveInput {
            source,
            destination,
            analyze,
        })
    }

    fn render_success(&mut self, doc: &mut Document, _request: &MoveInput, response: &MoveResponse) {
        doc.set_text(self.elements.message, response.message.clone());
        doc.set_text(self.elements.result_source, response.source.clone());
        doc.set_text(self.elements.result_destination, response.destination.clone());
    }

    fn render_error(&mut self, doc: &mut Document, request: &MoveInput, error: &ApiError) {
        doc.set_text(self.elements.message, error_text(error));
        doc.set_text(self.elements.result_source, request.source.clone());
        doc.set_text(self.elements.result_destination, MOVE_FAILED_MARKER);
    }

    fn command(&self, token: InvocationToken, request: MoveInput) -> BackendCommand {
        BackendCommand::MoveFile {
            token,
            input: request,
        }
    }
}
