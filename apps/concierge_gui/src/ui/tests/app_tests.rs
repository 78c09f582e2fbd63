use client_core::ApiError;
use crossbeam_channel::{bounded, Receiver, Sender};
use shared::protocol::{AskResponse, MocResponse, SearchResponse};

use super::*;
use crate::controller::{
    events::API_UNREACHABLE_MESSAGE,
    features::{
        ask::FOLLOWUP_CLASS, search::NO_RESULTS_MESSAGE, search::RESULT_CARD_CLASS, ERROR_CLASS,
    },
    orchestration::{InvocationToken, RequestStatus},
};
use crate::ui::layout::MODAL_CLOSE_CLASS;

struct Harness {
    app: ConciergeApp,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
}

impl Harness {
    fn new(fragment: Option<&str>) -> Self {
        let (cmd_tx, cmd_rx) = bounded(64);
        let (ui_tx, ui_rx) = bounded(64);
        let app = ConciergeApp::new(cmd_tx, ui_rx, fragment).expect("app");
        let harness = Self { app, cmd_rx, ui_tx };
        assert_eq!(harness.commands(), vec![BackendCommand::HealthCheck]);
        harness
    }

    fn commands(&self) -> Vec<BackendCommand> {
        self.cmd_rx.try_iter().collect()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        self.app.dispatch(DomEvent::Input {
            node,
            value: value.to_string(),
        });
    }

    fn click(&mut self, node: NodeId) {
        self.app.dispatch(DomEvent::Click(node));
    }

    fn deliver(&mut self, event: UiEvent) {
        self.ui_tx.send(event).expect("deliver event");
        self.app.on_frame();
    }

    fn visible_pages(&self) -> Vec<String> {
        self.app
            .registry()
            .pages
            .iter()
            .filter(|(_, node)| !self.app.document().is_hidden(*node))
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

fn single_token(commands: Vec<BackendCommand>) -> InvocationToken {
    match commands.as_slice() {
        [BackendCommand::Search { token, .. }]
        | [BackendCommand::Ask { token, .. }]
        | [BackendCommand::MoveFile { token, .. }]
        | [BackendCommand::GenerateMoc { token, .. }]
        | [BackendCommand::TagFile { token, .. }] => *token,
        other => panic!("expected exactly one feature command, got {other:?}"),
    }
}

#[test]
fn startup_shows_fragment_page_and_checks_health() {
    let harness = Harness::new(None);
    assert_eq!(harness.visible_pages(), vec!["home"]);

    let harness = Harness::new(Some("#ask"));
    assert_eq!(harness.visible_pages(), vec!["ask"]);
}

#[test]
fn nav_links_and_location_changes_drive_the_router() {
    let mut harness = Harness::new(None);
    let (_, search_link) = harness.app.registry().nav_links[1].clone();
    harness.click(search_link);
    assert_eq!(harness.visible_pages(), vec!["search"]);
    assert_eq!(harness.app.document().location_hash(), "search");
    harness.app.on_frame();
    assert_eq!(harness.visible_pages(), vec!["search"]);

    harness.app.doc.set_location_hash("#tag");
    harness.app.on_frame();
    assert_eq!(harness.visible_pages(), vec!["tag"]);

    harness.app.doc.set_location_hash("");
    harness.app.on_frame();
    assert_eq!(harness.visible_pages(), vec!["home"]);
}

#[test]
fn unhealthy_api_shows_non_blocking_banner() {
    let mut harness = Harness::new(None);
    let banner = harness.app.registry().status_banner;
    assert!(harness.app.document().is_hidden(banner));

    harness.deliver(UiEvent::HealthChecked { healthy: false });
    assert!(!harness.app.document().is_hidden(banner));
    assert_eq!(harness.app.document().text(banner), API_UNREACHABLE_MESSAGE);
    assert_eq!(
        harness.app.status().map(UiError::message),
        Some(API_UNREACHABLE_MESSAGE)
    );
}

#[test]
fn empty_required_fields_send_nothing() {
    let mut harness = Harness::new(None);
    let registry = harness.app.registry().clone();
    for submit in [
        registry.search.submit,
        registry.ask.submit,
        registry.mover.submit,
        registry.moc.submit,
        registry.tag.submit,
    ] {
        harness.click(submit);
    }
    assert!(harness.commands().is_empty());
    assert!(harness.app.document().is_hidden(registry.search.loading));
    assert_eq!(harness.app.search.state().status(), RequestStatus::Idle);
}

#[test]
fn temperature_slider_value_reaches_the_ask_command() {
    let mut harness = Harness::new(None);
    let ask = harness.app.registry().ask;
    harness.set_value(ask.question, "What links to this note?");
    harness.click(ask.submit);

    match harness.commands().as_slice() {
        [BackendCommand::Ask { input, .. }] => {
            assert_eq!(input.temperature, 0.7);
            assert_eq!(input.context_size, 3);
        }
        other => panic!("unexpected commands {other:?}"),
    }
}

#[test]
fn service_error_stays_inside_its_feature() {
    let mut harness = Harness::new(None);
    let registry = harness.app.registry().clone();

    harness.set_value(registry.search.query, "rust");
    harness.click(registry.search.submit);
    let search_token = single_token(harness.commands());

    harness.set_value(registry.mover.source, "inbox/a.md");
    harness.click(registry.mover.submit);
    let _move_token = single_token(harness.commands());

    harness.deliver(UiEvent::SearchResolved {
        token: search_token,
        outcome: Err(ApiError::status(500, None)),
    });

    assert_eq!(harness.app.search.state().status(), RequestStatus::Failed);
    assert_eq!(harness.app.mover.state().status(), RequestStatus::Loading);
    assert!(!harness.app.document().is_hidden(registry.mover.loading));
    assert!(harness.app.document().is_hidden(registry.mover.result));
    for status in [
        harness.app.ask.state().status(),
        harness.app.moc.state().status(),
        harness.app.tag.state().status(),
    ] {
        assert_eq!(status, RequestStatus::Idle);
    }
    assert!(harness.app.status().is_none());
}

#[test]
fn disconnected_backend_fails_the_request_in_place() {
    let (cmd_tx, cmd_rx) = bounded(64);
    let (_ui_tx, ui_rx) = bounded(64);
    let mut app = ConciergeApp::new(cmd_tx, ui_rx, Some("search")).expect("app");
    drop(cmd_rx);

    let search = app.registry().search;
    app.dispatch(DomEvent::Input {
        node: search.query,
        value: "rust".into(),
    });
    app.dispatch(DomEvent::Click(search.submit));
    for _ in 0..3 {
        app.on_frame();
    }

    assert_eq!(app.search.state().status(), RequestStatus::Failed);
    let doc = app.document();
    assert!(doc.is_hidden(search.loading));
    assert!(!doc.is_hidden(search.results));
    assert_eq!(doc.with_class(search.results, ERROR_CLASS).len(), 1);
    assert!(doc.text_content(search.results).contains("disconnected"));
    assert!(app
        .status()
        .is_some_and(|err| err.message().contains("disconnected")));
    assert!(!doc.is_hidden(app.registry().status_banner));
}

#[test]
fn full_command_queue_fails_the_request_in_place() {
    // Capacity one: the startup health check already fills the queue.
    let (cmd_tx, _cmd_rx) = bounded(1);
    let (_ui_tx, ui_rx) = bounded(64);
    let mut app = ConciergeApp::new(cmd_tx, ui_rx, Some("move")).expect("app");

    let mover = app.registry().mover;
    app.dispatch(DomEvent::Input {
        node: mover.source,
        value: "inbox/a.md".into(),
    });
    app.dispatch(DomEvent::Click(mover.submit));

    assert_eq!(app.mover.state().status(), RequestStatus::Failed);
    assert!(app.document().is_hidden(mover.loading));
    assert!(app
        .status()
        .is_some_and(|err| err.message().contains("queue is full")));
}

#[test]
fn empty_results_and_stale_responses() {
    let mut harness = Harness::new(None);
    let search = harness.app.registry().search;

    harness.set_value(search.query, "first");
    harness.click(search.submit);
    let first = single_token(harness.commands());
    harness.set_value(search.query, "second");
    harness.click(search.submit);
    let second = single_token(harness.commands());

    harness.deliver(UiEvent::SearchResolved {
        token: second,
        outcome: Ok(SearchResponse {
            results: Vec::new(),
            total: Some(0),
        }),
    });
    harness.deliver(UiEvent::SearchResolved {
        token: first,
        outcome: Err(ApiError::status(500, None)),
    });

    let doc = harness.app.document();
    assert!(doc.with_class(search.results, RESULT_CARD_CLASS).is_empty());
    assert_eq!(doc.text_content(search.results), NO_RESULTS_MESSAGE);
    assert_eq!(harness.app.search.state().status(), RequestStatus::Succeeded);
}

#[test]
fn followup_prompt_fills_question_and_resubmits() {
    let mut harness = Harness::new(None);
    let ask = harness.app.registry().ask;
    harness.set_value(ask.question, "What is a MOC?");
    harness.click(ask.submit);
    let token = single_token(harness.commands());
    harness.deliver(UiEvent::AskResolved {
        token,
        outcome: Ok(AskResponse {
            answer: "A map of content.".into(),
            context: Vec::new(),
            followup_questions: vec!["How do I build one?".into()],
            confidence: Some(0.9),
        }),
    });

    let prompt = harness
        .app
        .document()
        .with_class(ask.followups, FOLLOWUP_CLASS)[0];
    harness.click(prompt);
    assert_eq!(
        harness.app.document().value(ask.question),
        "How do I build one?"
    );
    match harness.commands().as_slice() {
        [BackendCommand::Ask { input, .. }] => assert_eq!(input.question, "How do I build one?"),
        other => panic!("unexpected commands {other:?}"),
    }
}

#[test]
fn moc_preview_traps_focus_and_restores_it() {
    let mut harness = Harness::new(Some("moc"));
    let moc = harness.app.registry().moc;

    harness.click(moc.preview_button);
    assert!(!harness.app.modal_is_open());

    harness.set_value(moc.topic, "rust");
    harness.set_value(moc.file_path, "MOCs/rust.md");
    harness.click(moc.submit);
    let token = single_token(harness.commands());
    harness.deliver(UiEvent::MocResolved {
        token,
        outcome: Ok(MocResponse {
            file_path: "MOCs/rust.md".into(),
            included_files: 7,
        }),
    });

    harness.click(moc.preview_button);
    assert!(harness.app.modal_is_open());
    assert!(harness.app.document().is_scroll_locked());
    harness.app.on_frame();

    let content = harness.app.registry().modal.content;
    let focusable = harness.app.document().focusable_within(content);
    assert_eq!(focusable.len(), 2);
    assert_eq!(harness.app.document().active_element(), Some(focusable[0]));
    assert!(harness
        .app
        .document()
        .text_content(content)
        .contains("Included files: 7"));

    assert_eq!(
        harness.app.handle_key(KeyPress::shift_tab()),
        KeyDisposition::Prevented
    );
    assert_eq!(harness.app.document().active_element(), Some(focusable[1]));
    assert_eq!(
        harness.app.handle_key(KeyPress::tab()),
        KeyDisposition::Prevented
    );
    assert_eq!(harness.app.document().active_element(), Some(focusable[0]));

    // Clicks behind the dialog are swallowed.
    harness.click(moc.submit);
    assert!(harness.commands().is_empty());

    let close = focusable[1];
    assert!(harness.app.document().has_class(close, MODAL_CLOSE_CLASS));
    harness.click(close);
    assert!(!harness.app.modal_is_open());
    assert!(!harness.app.document().is_scroll_locked());
    harness.app.on_frame();
    assert_eq!(
        harness.app.document().active_element(),
        Some(moc.preview_button)
    );
}

#[test]
fn search_filter_builder_round_trip() {
    let mut harness = Harness::new(Some("search"));
    let search = harness.app.registry().search;

    harness.app.dispatch(DomEvent::Toggle {
        node: search.filter_toggle,
        checked: true,
    });
    assert!(!harness.app.document().is_hidden(search.filter_panel));

    harness.set_value(search.tag_input, "project");
    harness.click(search.add_tag_button);
    assert_eq!(harness.app.document().value(search.tag_input), "");

    harness.set_value(search.query, "plans");
    harness.click(search.submit);
    match harness.commands().as_slice() {
        [BackendCommand::Search { input, .. }] => {
            assert_eq!(
                input.filters.as_ref().map(|f| f.tags.clone()),
                Some(vec!["project".to_string()])
            );
        }
        other => panic!("unexpected commands {other:?}"),
    }

    let close = harness
        .app
        .document()
        .with_class(search.selected_tags, crate::ui::tags::TAG_CLOSE_CLASS)[0];
    harness.click(close);
    assert!(harness.app.search.feature().filter_tags().is_empty());

    harness.app.dispatch(DomEvent::Toggle {
        node: search.filter_toggle,
        checked: false,
    });
    assert!(harness.app.document().is_hidden(search.filter_panel));
}
