use client_core::ApiError;
use shared::{domain::TagList, protocol::TagResponse};

use super::{error_text, required_value};
use crate::{
    backend_bridge::commands::{BackendCommand, TagInput},
    controller::orchestration::{Feature, InvocationToken, Regions},
    ui::{
        document::{Document, Markup, NodeId},
        registry::TagElements,
        tags::TagCollection,
    },
};

pub const NO_TAGS_MESSAGE: &str = "No tags were applied";

pub struct TagFeature {
    elements: TagElements,
    applied: TagCollection,
}

impl TagFeature {
    pub fn new(elements: TagElements) -> Self {
        Self {
            applied: TagCollection::new(elements.applied_tags),
            elements,
        }
    }

    #[cfg(test)]
    pub fn elements(&self) -> &TagElements {
        &self.elements
    }

    #[cfg(test)]
    pub fn applied(&self) -> &TagCollection {
        &self.applied
    }

    pub fn remove_applied_tag(&mut self, doc: &mut Document, close: NodeId) -> bool {
        self.applied.remove_by_close(doc, close)
    }

    /// Shows the tag field only in manual mode.
    pub fn sync_mode(&self, doc: &mut Document) {
        let manual = doc.is_checked(self.elements.manual_mode);
        doc.set_hidden(self.elements.manual_container, !manual);
    }
}

impl Feature for TagFeature {
    type Request = TagInput;
    type Response = TagResponse;

    fn name(&self) -> &'static str {
        "tag"
    }

    fn regions(&self) -> Regions {
        Regions {
            loading: self.elements.loading,
            result: self.elements.result,
        }
    }

    fn validate(&self, doc: &Document) -> Option<TagInput> {
        let path = required_value(doc, self.elements.path)?;
        let analyze = doc.is_checked(self.elements.analyze_mode);
        let tags = if analyze {
            None
        } else {
            Some(TagList::parse(&required_value(doc, self.elements.tags)?))
        };
        Some(TagInput {
            path,
            tags,
            analyze,
        })
    }

    fn render_success(&mut self, doc: &mut Document, _request: &TagInput, response: &TagResponse) {
        doc.set_text(self.elements.message, response.message.clone());
        doc.set_text(self.elements.result_path, response.path.clone());
        self.applied.replace_all(doc, response.tags.iter().cloned());
        if response.tags.is_empty() {
            doc.append(
                self.elements.applied_tags,
                Markup::paragraph(NO_TAGS_MESSAGE).class("no-tags"),
            );
        }
    }

    fn render_error(&mut self, doc: &mut Document, request: &TagInput, error: &ApiError) {
        doc.set_text(self.elements.message, error_text(error));
        doc.set_text(self.elements.result_path, request.path.clone());
        self.applied.clear(doc);
    }

    fn command(&self, token: InvocationToken, request: TagInput) -> BackendCommand {
        BackendCommand::TagFile {
            token,
            input: request,
        }
    }
}
