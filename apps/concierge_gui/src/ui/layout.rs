//! Page skeleton: every identifier the controller locates at startup.

use client_core::DEFAULT_CONTEXT_SIZE;
use shared::domain::PageId;

use crate::ui::document::{Document, Markup};

pub const PAGE_CLASS: &str = "page";
pub const NAV_ITEM_CLASS: &str = "nav-item";
pub const ACTIVE_CLASS: &str = "active";
pub const MODAL_BACKDROP_CLASS: &str = "modal-backdrop";
pub const MODAL_CONTENT_CLASS: &str = "modal-content";
pub const MODAL_CLOSE_CLASS: &str = "modal-close";

pub const CONTEXT_SIZE_RANGE: (i32, i32) = (1, 10);
pub const TEMPERATURE_RANGE: (i32, i32) = (0, 10);
pub const DEFAULT_TEMPERATURE_STEP: i32 = 7;

const NAV_PAGES: [(&str, &str); 6] = [
    (PageId::HOME, "Home"),
    ("search", "Search"),
    ("ask", "Ask"),
    ("move", "Move"),
    ("moc", "Map of content"),
    ("tag", "Tags"),
];

fn page(id: &str) -> Markup {
    Markup::container()
        .id(format!("{id}-page"))
        .class(PAGE_CLASS)
        .hidden(true)
}

fn field(label: &str, control: Markup) -> Markup {
    Markup::container()
        .class("field")
        .child(Markup::span(label))
        .child(control)
}

fn labelled_value(label: &str, id: &str) -> Markup {
    Markup::paragraph("")
        .child(Markup::strong(label))
        .child(Markup::span("").id(id))
}

fn loading(id: &str, text: &str) -> Markup {
    Markup::paragraph(text).id(id).class("loading").hidden(true)
}

fn navigation() -> Markup {
    Markup::container()
        .id("nav")
        .class("nav")
        .children(NAV_PAGES.iter().map(|(id, label)| {
            Markup::link(*label, format!("#{id}"))
                .class(NAV_ITEM_CLASS)
                .attr("data-page", *id)
        }))
}

fn home_page() -> Markup {
    page(PageId::HOME)
        .child(Markup::heading("Obsidian Concierge"))
        .child(Markup::paragraph(
            "Search your vault, ask questions about your notes, reorganize files, \
             generate maps of content and manage tags.",
        ))
}

fn search_page() -> Markup {
    page("search")
        .child(Markup::heading("Search"))
        .child(field("Query", Markup::text_input().id("search-query")))
        .child(Markup::checkbox("Filter by tags").id("search-tags"))
        .child(
            Markup::container()
                .id("tags-filter")
                .hidden(true)
                .child(field("Tag", Markup::text_input().id("tag-input")))
                .child(Markup::button("Add tag").id("add-tag-button"))
                .child(Markup::container().id("selected-tags").class("tag-list")),
        )
        .child(Markup::button("Search").id("search-button"))
        .child(loading("search-loading", "Searching..."))
        .child(Markup::container().id("search-results"))
}

fn ask_page() -> Markup {
    page("ask")
        .child(Markup::heading("Ask a question"))
        .child(field("Question", Markup::text_area().id("question-input")))
        .child(Markup::checkbox("Advanced options").id("advanced-options"))
        .child(
            Markup::container()
                .id("qa-options")
                .hidden(true)
                .child(field(
                    "Context size",
                    Markup::range(
                        CONTEXT_SIZE_RANGE.0,
                        CONTEXT_SIZE_RANGE.1,
                        i32::try_from(DEFAULT_CONTEXT_SIZE).unwrap_or(CONTEXT_SIZE_RANGE.0),
                    )
                    .id("context-size"),
                ))
                .child(field(
                    "Temperature",
                    Markup::range(
                        TEMPERATURE_RANGE.0,
                        TEMPERATURE_RANGE.1,
                        DEFAULT_TEMPERATURE_STEP,
                    )
                    .id("temperature"),
                )),
        )
        .child(Markup::button("Ask").id("ask-button"))
        .child(loading("qa-loading", "Thinking..."))
        .child(
            Markup::container()
                .id("answer-container")
                .hidden(true)
                .child(Markup::container().id("answer-content"))
                .child(Markup::heading("Sources"))
                .child(Markup::container().id("answer-sources"))
                .child(Markup::heading("Follow-up questions"))
                .child(Markup::container().id("followup-questions")),
        )
}

fn move_page() -> Markup {
    page("move")
        .child(Markup::heading("Move a file"))
        .child(field("File path", Markup::text_input().id("file-path")))
        .child(
            Markup::radio("move-mode", "Let the assistant choose a destination")
                .id("analyze-move")
                .checked(true),
        )
        .child(Markup::radio("move-mode", "Choose the destination").id("manual-move"))
        .child(
            Markup::container()
                .id("destination-container")
                .hidden(true)
                .child(field("Destination", Markup::text_input().id("destination-path"))),
        )
        .child(Markup::button("Move").id("move-button"))
        .child(loading("move-loading", "Moving..."))
        .child(
            Markup::container()
                .id("move-result")
                .hidden(true)
                .child(Markup::paragraph("").id("move-message"))
                .child(labelled_value("Source: ", "move-source"))
                .child(labelled_value("Destination: ", "move-destination")),
        )
}

fn moc_page() -> Markup {
    page("moc")
        .child(Markup::heading("Generate a map of content"))
        .child(Markup::radio("moc-type", "By topic").id("topic-moc").checked(true))
        .child(Markup::radio("moc-type", "By folder").id("folder-moc"))
        .child(Markup::radio("moc-type", "By tag").id("tag-moc"))
        .child(
            Markup::container()
                .id("topic-input-container")
                .child(field("Topic", Markup::text_input().id("topic-input"))),
        )
        .child(
            Markup::container()
                .id("folder-input-container")
                .hidden(true)
                .child(field("Folder", Markup::text_input().id("folder-input"))),
        )
        .child(
            Markup::container()
                .id("tag-input-container")
                .hidden(true)
                .child(field("Tag", Markup::text_input().id("tag-name-input"))),
        )
        .child(field("Output file", Markup::text_input().id("moc-path")))
        .child(Markup::button("Generate").id("generate-moc-button"))
        .child(loading("moc-loading", "Generating..."))
        .child(
            Markup::container()
                .id("moc-result")
                .hidden(true)
                .child(Markup::paragraph("").id("moc-message"))
                .child(labelled_value("File: ", "moc-file-path"))
                .child(labelled_value("Included files: ", "moc-included-files"))
                .child(Markup::button("Preview").id("view-moc-button")),
        )
}

fn tag_page() -> Markup {
    page("tag")
        .child(Markup::heading("Tag a file"))
        .child(field("File path", Markup::text_input().id("tag-file-path")))
        .child(
            Markup::radio("tag-mode", "Let the assistant suggest tags")
                .id("analyze-tags")
                .checked(true),
        )
        .child(Markup::radio("tag-mode", "Enter tags").id("manual-tags"))
        .child(
            Markup::container()
                .id("manual-tags-container")
                .hidden(true)
                .child(field(
                    "Tags (comma separated)",
                    Markup::text_input().id("tags-input"),
                )),
        )
        .child(Markup::button("Apply tags").id("tag-button"))
        .child(loading("tag-loading", "Tagging..."))
        .child(
            Markup::container()
                .id("tag-result")
                .hidden(true)
                .child(Markup::paragraph("").id("tag-message"))
                .child(labelled_value("File: ", "tagged-file-path"))
                .child(Markup::container().id("applied-tags").class("tag-list")),
        )
}

fn modal() -> Markup {
    Markup::container()
        .id("moc-preview-modal")
        .class(MODAL_BACKDROP_CLASS)
        .attr("role", "dialog")
        .attr("aria-modal", "true")
        .hidden(true)
        .child(
            Markup::container()
                .id("moc-preview-content")
                .class(MODAL_CONTENT_CLASS),
        )
}

/// The full single-page document, every page hidden until the router runs.
pub fn build_document() -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    for section in [
        Markup::paragraph("").id("status-banner").hidden(true),
        navigation(),
        home_page(),
        search_page(),
        ask_page(),
        move_page(),
        moc_page(),
        tag_page(),
        modal(),
    ] {
        doc.append(root, section);
    }
    doc
}
