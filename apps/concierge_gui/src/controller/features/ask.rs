use client_core::{ApiError, DEFAULT_CONTEXT_SIZE};
use shared::protocol::AskResponse;

use super::{error_text, required_value, ERROR_CLASS};
use crate::{
    backend_bridge::commands::{AskInput, BackendCommand},
    controller::orchestration::{Feature, InvocationToken, Regions},
    ui::{
        document::{Document, Markup, NodeId},
        layout::DEFAULT_TEMPERATURE_STEP,
        registry::AskElements,
    },
};

pub const FOLLOWUP_CLASS: &str = "followup-question";
pub const NO_SOURCES_MESSAGE: &str = "No sources found";
pub const FALLBACK_FOLLOWUPS: [&str; 3] = [
    "Tell me more about this",
    "How can I use this information?",
    "Are there related topics?",
];

/// Maps the 0-10 temperature slider onto the service's 0.0-1.0 scale.
pub fn temperature_from_slider(step: i32) -> f64 {
    f64::from(step) / 10.0
}

pub struct AskFeature {
    elements: AskElements,
}

impl AskFeature {
    pub fn new(elements: AskElements) -> Self {
        Self { elements }
    }

    #[cfg(test)]
    pub fn elements(&self) -> &AskElements {
        &self.elements
    }

    pub fn set_options_visible(&self, doc: &mut Document, visible: bool) {
        doc.set_hidden(self.elements.options_panel, !visible);
    }

    /// Copies an activated follow-up prompt into the question field. Returns
    /// false when `node` is not a follow-up prompt.
    pub fn apply_followup(&self, doc: &mut Document, node: NodeId) -> bool {
        if !doc.has_class(node, FOLLOWUP_CLASS) || !doc.is_within(node, self.elements.followups) {
            return false;
        }
        let prompt = doc.text(node).to_string();
        doc.set_value(self.elements.question, prompt);
        true
    }
}

fn answer_markup(answer: &str) -> Vec<Markup> {
    let mut lines = Vec::new();
    for (index, line) in answer.split('\n').enumerate() {
        if index > 0 {
            lines.push(Markup::line_break());
        }
        lines.push(Markup::span(line));
    }
    lines
}

impl Feature for AskFeature {
    type Request = AskInput;
    type Response = AskResponse;

    fn name(&self) -> &'static str {
        "ask"
    }

    fn regions(&self) -> Regions {
        Regions {
            loading: self.elements.loading,
            result: self.elements.answer_container,
        }
    }

    fn validate(&self, doc: &Document) -> Option<AskInput> {
        let question = required_value(doc, self.elements.question)?;
        let context_size = doc
            .value(self.elements.context_size)
            .trim()
            .parse()
            .unwrap_or(DEFAULT_CONTEXT_SIZE);
        let step = doc
            .value(self.elements.temperature)
            .trim()
            .parse()
            .unwrap_or(DEFAULT_TEMPERATURE_STEP);
        Some(AskInput {
            question,
            context_size,
            temperature: temperature_from_slider(step),
        })
    }

    fn render_success(&mut self, doc: &mut Document, _request: &AskInput, response: &AskResponse) {
        doc.replace_children(self.elements.answer_content, answer_markup(&response.answer));

        if response.context.is_empty() {
            doc.replace_children(
                self.elements.sources,
                [Markup::paragraph(NO_SOURCES_MESSAGE).class("no-sources")],
            );
        } else {
            doc.replace_children(
                self.elements.sources,
                response.context.iter().map(|source| {
                    Markup::paragraph(format!("{} ({})", source.title, source.path))
                        .class("source-item")
                }),
            );
        }

        let followups: Vec<String> = if response.followup_questions.is_empty() {
            FALLBACK_FOLLOWUPS.iter().map(|q| q.to_string()).collect()
        } else {
            response.followup_questions.clone()
        };
        doc.replace_children(
            self.elements.followups,
            followups
                .into_iter()
                .map(|question| Markup::button(question).class(FOLLOWUP_CLASS)),
        );
    }

    fn render_error(&mut self, doc: &mut Document, _request: &AskInput, error: &ApiError) {
        doc.replace_children(
            self.elements.answer_content,
            [Markup::paragraph(error_text(error)).class(ERROR_CLASS)],
        );
        doc.clear_children(self.elements.sources);
        doc.clear_children(self.elements.followups);
    }

    fn command(&self, token: InvocationToken, request: AskInput) -> BackendCommand {
        BackendCommand::Ask {
            token,
            input: request,
        }
    }
}
