use client_core::{ApiError, DEFAULT_SEARCH_LIMIT};
use shared::protocol::{SearchFilters, SearchResponse};

use super::{error_text, required_value, ERROR_CLASS};
use crate::{
    backend_bridge::commands::{BackendCommand, SearchInput},
    controller::orchestration::{Feature, InvocationToken, Regions},
    ui::{
        document::{Document, Markup, NodeId},
        registry::SearchElements,
        tags::TagCollection,
    },
};

pub const RESULT_CARD_CLASS: &str = "result-card";
pub const NO_RESULTS_MESSAGE: &str = "No results found";

pub struct SearchFeature {
    elements: SearchElements,
    filter_tags: TagCollection,
}

impl SearchFeature {
    pub fn new(elements: SearchElements) -> Self {
        Self {
            filter_tags: TagCollection::new(elements.selected_tags),
            elements,
        }
    }

    #[cfg(test)]
    pub fn elements(&self) -> &SearchElements {
        &self.elements
    }

    #[cfg(test)]
    pub fn filter_tags(&self) -> &TagCollection {
        &self.filter_tags
    }

    /// Moves the tag input into a new filter chip. Blank input is ignored.
    pub fn add_filter_tag(&mut self, doc: &mut Document) {
        let Some(tag) = required_value(doc, self.elements.tag_input) else {
            return;
        };
        self.filter_tags.add(doc, tag);
        doc.set_value(self.elements.tag_input, "");
    }

    pub fn remove_filter_tag(&mut self, doc: &mut Document, close: NodeId) -> bool {
        self.filter_tags.remove_by_close(doc, close)
    }

    pub fn set_filter_panel_visible(&self, doc: &mut Document, visible: bool) {
        doc.set_hidden(self.elements.filter_panel, !visible);
    }
}

fn result_card(title: &str, path: &str, excerpt: &str, relevance_percent: i64) -> Markup {
    Markup::container()
        .class(RESULT_CARD_CLASS)
        .child(Markup::heading(title))
        .child(Markup::paragraph(path).class("result-path"))
        .child(Markup::paragraph(excerpt).class("result-excerpt"))
        .child(
            Markup::paragraph(format!("Relevance: {relevance_percent}%")).class("result-relevance"),
        )
}

impl Feature for SearchFeature {
    type Request = SearchInput;
    type Response = SearchResponse;

    fn name(&self) -> &'static str {
        "search"
    }

    fn regions(&self) -> Regions {
        Regions {
            loading: self.elements.loading,
            result: self.elements.results,
        }
    }

    fn validate(&self, doc: &Document) -> Option<SearchInput> {
        let query = required_value(doc, self.elements.query)?;
        let filters = (doc.is_checked(self.elements.filter_toggle) && !self.filter_tags.is_empty())
            .then(|| SearchFilters {
                tags: self.filter_tags.values(),
            });
        Some(SearchInput {
            query,
            limit: DEFAULT_SEARCH_LIMIT,
            filters,
        })
    }

    fn render_success(
        &mut self,
        doc: &mut Document,
        _request: &SearchInput,
        response: &SearchResponse,
    ) {
        if response.results.is_empty() {
            doc.replace_children(
                self.elements.results,
                [Markup::paragraph(NO_RESULTS_MESSAGE).class("no-results")],
            );
            return;
        }
        doc.replace_children(
            self.elements.results,
            response.results.iter().map(|hit| {
                result_card(&hit.title, &hit.path, &hit.excerpt, hit.relevance_percent())
            }),
        );
    }

    fn render_error(&mut self, doc: &mut Document, _request: &SearchInput, error: &ApiError) {
        doc.replace_children(
            self.elements.results,
            [Markup::paragraph(error_text(error)).class(ERROR_CLASS)],
        );
    }

    fn command(&self, token: InvocationToken, request: SearchInput) -> BackendCommand {
        BackendCommand::Search {
            token,
            input: request,
        }
    }
}
