//! Typed handles to every element the controller touches, resolved once at startup.

use shared::domain::PageId;
use thiserror::Error;

use crate::ui::{
    document::{Document, NodeId},
    layout::{MODAL_BACKDROP_CLASS, MODAL_CONTENT_CLASS, NAV_ITEM_CLASS, PAGE_CLASS},
};

const PAGE_ID_SUFFIX: &str = "-page";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("required element '#{0}' is missing from the document")]
    MissingElement(&'static str),
    #[error("required element '.{0}' is missing from the document")]
    MissingClass(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct SearchElements {
    pub query: NodeId,
    pub filter_toggle: NodeId,
    pub filter_panel: NodeId,
    pub tag_input: NodeId,
    pub add_tag_button: NodeId,
    pub selected_tags: NodeId,
    pub submit: NodeId,
    pub loading: NodeId,
    pub results: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct AskElements {
    pub question: NodeId,
    pub options_toggle: NodeId,
    pub options_panel: NodeId,
    pub context_size: NodeId,
    pub temperature: NodeId,
    pub submit: NodeId,
    pub loading: NodeId,
    pub answer_container: NodeId,
    pub answer_content: NodeId,
    pub sources: NodeId,
    pub followups: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct MoveElements {
    pub source: NodeId,
    pub analyze_mode: NodeId,
    pub manual_mode: NodeId,
    pub destination_container: NodeId,
    pub destination: NodeId,
    pub submit: NodeId,
    pub loading: NodeId,
    pub result: NodeId,
    pub message: NodeId,
    pub result_source: NodeId,
    pub result_destination: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct MocElements {
    pub topic_mode: NodeId,
    pub folder_mode: NodeId,
    pub tag_mode: NodeId,
    pub topic_container: NodeId,
    pub folder_container: NodeId,
    pub tag_container: NodeId,
    pub topic: NodeId,
    pub folder: NodeId,
    pub tag: NodeId,
    pub file_path: NodeId,
    pub submit: NodeId,
    pub loading: NodeId,
    pub result: NodeId,
    pub message: NodeId,
    pub result_file_path: NodeId,
    pub included_files: NodeId,
    pub preview_button: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct TagElements {
    pub path: NodeId,
    pub analyze_mode: NodeId,
    pub manual_mode: NodeId,
    pub manual_container: NodeId,
    pub tags: NodeId,
    pub submit: NodeId,
    pub loading: NodeId,
    pub result: NodeId,
    pub message: NodeId,
    pub result_path: NodeId,
    pub applied_tags: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct ModalElements {
    pub backdrop: NodeId,
    pub content: NodeId,
}

#[derive(Debug, Clone)]
pub struct ElementRegistry {
    pub status_banner: NodeId,
    pub pages: Vec<(PageId, NodeId)>,
    pub nav_links: Vec<(PageId, NodeId)>,
    pub search: SearchElements,
    pub ask: AskElements,
    pub mover: MoveElements,
    pub moc: MocElements,
    pub tag: TagElements,
    pub modal: ModalElements,
}

fn require(doc: &Document, dom_id: &'static str) -> Result<NodeId, RegistryError> {
    doc.by_dom_id(dom_id)
        .ok_or(RegistryError::MissingElement(dom_id))
}

fn require_class(doc: &Document, class: &'static str) -> Result<NodeId, RegistryError> {
    doc.with_class(doc.root(), class)
        .into_iter()
        .next()
        .ok_or(RegistryError::MissingClass(class))
}

impl ElementRegistry {
    pub fn locate(doc: &Document) -> Result<Self, RegistryError> {
        let root = doc.root();
        let pages = doc
            .with_class(root, PAGE_CLASS)
            .into_iter()
            .filter_map(|node| {
                let page_id = doc.dom_id(node)?.strip_suffix(PAGE_ID_SUFFIX)?;
                Some((PageId::new(page_id), node))
            })
            .collect();
        let nav_links = doc
            .with_class(root, NAV_ITEM_CLASS)
            .into_iter()
            .filter_map(|node| Some((PageId::new(doc.attr(node, "data-page")?), node)))
            .collect();

        let backdrop = require_class(doc, MODAL_BACKDROP_CLASS)?;
        let content = doc
            .with_class(backdrop, MODAL_CONTENT_CLASS)
            .into_iter()
            .next()
            .ok_or(RegistryError::MissingClass(MODAL_CONTENT_CLASS))?;

        Ok(Self {
            status_banner: require(doc, "status-banner")?,
            pages,
            nav_links,
            search: SearchElements {
                query: require(doc, "search-query")?,
                filter_toggle: require(doc, "search-tags")?,
                filter_panel: require(doc, "tags-filter")?,
                tag_input: require(doc, "tag-input")?,
                add_tag_button: require(doc, "add-tag-button")?,
                selected_tags: require(doc, "selected-tags")?,
                submit: require(doc, "search-button")?,
                loading: require(doc, "search-loading")?,
                results: require(doc, "search-results")?,
            },
            ask: AskElements {
                question: require(doc, "question-input")?,
                options_toggle: require(doc, "advanced-options")?,
                options_panel: require(doc, "qa-options")?,
                context_size: require(doc, "context-size")?,
                temperature: require(doc, "temperature")?,
                submit: require(doc, "ask-button")?,
                loading: require(doc, "qa-loading")?,
                answer_container: require(doc, "answer-container")?,
                answer_content: require(doc, "answer-content")?,
                sources: require(doc, "answer-sources")?,
                followups: require(doc, "followup-questions")?,
            },
            mover: MoveElements {
                source: require(doc, "file-path")?,
                analyze_mode: require(doc, "analyze-move")?,
                manual_mode: require(doc, "manual-move")?,
                destination_container: require(doc, "destination-container")?,
                destination: require(doc, "destination-path")?,
                submit: require(doc, "move-button")?,
                loading: require(doc, "move-loading")?,
                result: require(doc, "move-result")?,
                message: require(doc, "move-message")?,
                result_source: require(doc, "move-source")?,
                result_destination: require(doc, "move-destination")?,
            },
            moc: MocElements {
                topic_mode: require(doc, "topic-moc")?,
                folder_mode: require(doc, "folder-moc")?,
                tag_mode: require(doc, "tag-moc")?,
                topic_container: require(doc, "topic-input-container")?,
                folder_container: require(doc, "folder-input-container")?,
                tag_container: require(doc, "tag-input-container")?,
                topic: require(doc, "topic-input")?,
                folder: require(doc, "folder-input")?,
                tag: require(doc, "tag-name-input")?,
                file_path: require(doc, "moc-path")?,
                submit: require(doc, "generate-moc-button")?,
                loading: require(doc, "moc-loading")?,
                result: require(doc, "moc-result")?,
                message: require(doc, "moc-message")?,
                result_file_path: require(doc, "moc-file-path")?,
                included_files: require(doc, "moc-included-files")?,
                preview_button: require(doc, "view-moc-button")?,
            },
            tag: TagElements {
                path: require(doc, "tag-file-path")?,
                analyze_mode: require(doc, "analyze-tags")?,
                manual_mode: require(doc, "manual-tags")?,
                manual_container: require(doc, "manual-tags-container")?,
                tags: require(doc, "tags-input")?,
                submit: require(doc, "tag-button")?,
                loading: require(doc, "tag-loading")?,
                result: require(doc, "tag-result")?,
                message: require(doc, "tag-message")?,
                result_path: require(doc, "tagged-file-path")?,
                applied_tags: require(doc, "applied-tags")?,
            },
            modal: ModalElements { backdrop, content },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::layout::build_document;

    #[test]
    fn locates_every_element_of_the_built_layout() {
        let doc = build_document();
        let registry = ElementRegistry::locate(&doc).expect("registry");
        let pages: Vec<&str> = registry.pages.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(pages, vec!["home", "search", "ask", "move", "moc", "tag"]);
        assert_eq!(registry.nav_links.len(), pages.len());
    }

    #[test]
    fn missing_identifier_is_reported_by_name() {
        let mut doc = build_document();
        let button = doc.by_dom_id("search-button").expect("button");
        doc.remove(button);
        let err = ElementRegistry::locate(&doc).expect_err("must fail");
        assert_eq!(err, RegistryError::MissingElement("search-button"));
    }
}
