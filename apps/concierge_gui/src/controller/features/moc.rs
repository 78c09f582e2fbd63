use client_core::ApiError;
use shared::{
    domain::{MocKind, MocTarget},
    protocol::MocResponse,
};

use super::{error_text, required_value};
use crate::{
    backend_bridge::commands::{BackendCommand, MocInput},
    controller::orchestration::{Feature, InvocationToken, Regions},
    ui::{
        document::{Document, Markup},
        layout::MODAL_CLOSE_CLASS,
        registry::MocElements,
    },
};

pub const MOC_SUCCESS_MESSAGE: &str = "MOC generated and saved successfully!";

pub struct MocFeature {
    elements: MocElements,
    last_result: Option<MocResponse>,
}

impl MocFeature {
    pub fn new(elements: MocElements) -> Self {
        Self {
            elements,
            last_result: None,
        }
    }

    #[cfg(test)]
    pub fn elements(&self) -> &MocElements {
        &self.elements
    }

    #[cfg(test)]
    pub fn last_result(&self) -> Option<&MocResponse> {
        self.last_result.as_ref()
    }

    pub fn selected_kind(&self, doc: &Document) -> MocKind {
        if doc.is_checked(self.elements.folder_mode) {
            MocKind::Folder
        } else if doc.is_checked(self.elements.tag_mode) {
            MocKind::Tag
        } else {
            MocKind::Topic
        }
    }

    /// Shows the parameter input of the selected kind and hides the others.
    pub fn sync_mode(&self, doc: &mut Document) {
        let kind = self.selected_kind(doc);
        doc.set_hidden(self.elements.topic_container, kind != MocKind::Topic);
        doc.set_hidden(self.elements.folder_container, kind != MocKind::Folder);
        doc.set_hidden(self.elements.tag_container, kind != MocKind::Tag);
    }

    /// Dialog body previewing the latest successful generation.
    pub fn preview_markup(&self) -> Option<Vec<Markup>> {
        let result = self.last_result.as_ref()?;
        Some(vec![
            Markup::container()
                .class("modal-header")
                .child(Markup::heading("MOC preview"))
                .child(
                    Markup::button("×")
                        .class(MODAL_CLOSE_CLASS)
                        .attr("aria-label", "Close"),
                ),
            Markup::container()
                .class("modal-body")
                .child(Markup::paragraph(format!(
                    "Generated file: {}",
                    result.file_path
                )))
                .child(Markup::paragraph(format!(
                    "Included files: {}",
                    result.included_files
                ))),
            Markup::container()
                .class("modal-footer")
                .child(Markup::button("Close").class(MODAL_CLOSE_CLASS)),
        ])
    }
}

impl Feature for MocFeature {
    type Request = MocInput;
    type Response = MocResponse;

    fn name(&self) -> &'static str {
        "moc"
    }

    fn regions(&self) -> Regions {
        Regions {
            loading: self.elements.loading,
            result: self.elements.result,
        }
    }

    fn validate(&self, doc: &Document) -> Option<MocInput> {
        let kind = self.selected_kind(doc);
        let input = match kind {
            MocKind::Topic => self.elements.topic,
            MocKind::Folder => self.elements.folder,
            MocKind::Tag => self.elements.tag,
        };
        let value = required_value(doc, input)?;
        let file_path = required_value(doc, self.elements.file_path)?;
        Some(MocInput {
            target: MocTarget::new(kind, value),
            file_path,
        })
    }

    fn render_success(&mut self, doc: &mut Document, _request: &MocInput, response: &MocResponse) {
        doc.set_text(self.elements.message, MOC_SUCCESS_MESSAGE);
        doc.set_text(self.elements.result_file_path, response.file_path.clone());
        doc.set_text(
            self.elements.included_files,
            response.included_files.to_string(),
        );
        self.last_result = Some(response.clone());
    }

    fn render_error(&mut self, doc: &mut Document, request: &MocInput, error: &ApiError) {
        doc.set_text(self.elements.message, error_text(error));
        doc.set_text(self.elements.result_file_path, request.file_path.clone());
        doc.set_text(self.elements.included_files, "0");
    }

    fn command(&self, token: InvocationToken, request: MocInput) -> BackendCommand {
        BackendCommand::GenerateMoc {
            token,
            input: request,
        }
    }
}
