use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use client_core::{ApiError, ConciergeApi};
use crossbeam_channel::bounded;
use shared::{
    domain::{MocKind, MocTarget, TagList},
    protocol::{
        AskResponse, MocResponse, MoveResponse, SearchFilters, SearchHit, SearchResponse,
        TagResponse,
    },
};

use super::*;
use crate::{
    backend_bridge::commands::{AskInput, MocInput, MoveInput, SearchInput, TagInput},
    controller::orchestration::InvocationToken,
};

#[derive(Default)]
struct RecordingApi {
    calls: Mutex<Vec<String>>,
    healthy: bool,
}

impl RecordingApi {
    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ConciergeApi for RecordingApi {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        filters: Option<SearchFilters>,
    ) -> Result<SearchResponse, ApiError> {
        self.record(format!("search {query} {limit} {filters:?}"));
        Ok(SearchResponse {
            results: vec![SearchHit {
                title: "Note".into(),
                path: "notes/note.md".into(),
                excerpt: "...".into(),
                relevance: 0.5,
            }],
            total: None,
        })
    }

    async fn ask_question(
        &self,
        question: &str,
        context_size: u32,
        temperature: f64,
    ) -> Result<AskResponse, ApiError> {
        self.record(format!("ask {question} {context_size} {temperature}"));
        Err(ApiError::status(500, None))
    }

    async fn move_file(
        &self,
        source: &str,
        destination: Option<&str>,
        analyze: bool,
    ) -> Result<MoveResponse, ApiError> {
        self.record(format!("move {source} {destination:?} {analyze}"));
        Ok(MoveResponse {
            message: "moved".into(),
            source: source.into(),
            destination: destination.unwrap_or("inbox/a.md").into(),
        })
    }

    async fn generate_moc(
        &self,
        target: &MocTarget,
        file_path: &str,
    ) -> Result<MocResponse, ApiError> {
        self.record(format!("moc {} {} {file_path}", target.kind(), target.value()));
        Ok(MocResponse {
            file_path: file_path.into(),
            included_files: 4,
        })
    }

    async fn tag_file(
        &self,
        path: &str,
        tags: Option<TagList>,
        analyze: bool,
    ) -> Result<TagResponse, ApiError> {
        self.record(format!("tag {path} {tags:?} {analyze}"));
        Ok(TagResponse {
            message: "tagged".into(),
            path: path.into(),
            tags: tags.map(TagList::into_vec).unwrap_or_default(),
        })
    }

    async fn health_check(&self) -> bool {
        self.record("health".into());
        self.healthy
    }
}

#[tokio::test]
async fn execute_maps_each_command_to_its_resolution_event() {
    let api = RecordingApi {
        healthy: true,
        ..Default::default()
    };
    let token = InvocationToken::new(3);

    let event = execute(
        &api,
        BackendCommand::Search {
            token,
            input: SearchInput {
                query: "rust".into(),
                limit: 10,
                filters: None,
            },
        },
    )
    .await;
    match event {
        UiEvent::SearchResolved { token: got, outcome } => {
            assert_eq!(got, token);
            assert_eq!(outcome.expect("search ok").results.len(), 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let event = execute(
        &api,
        BackendCommand::Ask {
            token,
            input: AskInput {
                question: "why?".into(),
                context_size: 3,
                temperature: 0.7,
            },
        },
    )
    .await;
    match event {
        UiEvent::AskResolved { outcome, .. } => {
            assert_eq!(outcome.expect_err("ask fails").http_status(), Some(500));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let event = execute(
        &api,
        BackendCommand::GenerateMoc {
            token,
            input: MocInput {
                target: MocTarget::new(MocKind::Folder, "projects"),
                file_path: "MOC.md".into(),
            },
        },
    )
    .await;
    assert!(matches!(
        event,
        UiEvent::MocResolved { outcome: Ok(MocResponse { included_files: 4, .. }), .. }
    ));

    let event = execute(&api, BackendCommand::HealthCheck).await;
    assert!(matches!(event, UiEvent::HealthChecked { healthy: true }));

    assert_eq!(
        api.calls(),
        vec![
            "search rust 10 None".to_string(),
            "ask why? 3 0.7".to_string(),
            "moc folder projects MOC.md".to_string(),
            "health".to_string(),
        ]
    );
}

#[test]
fn worker_runs_commands_and_reports_back() {
    let api = Arc::new(RecordingApi::default());
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(8);
    let worker = launch(api.clone(), cmd_rx, ui_tx);

    cmd_tx
        .send(BackendCommand::MoveFile {
            token: InvocationToken::new(1),
            input: MoveInput {
                source: "a.md".into(),
                destination: None,
                analyze: true,
            },
        })
        .expect("queue move");
    cmd_tx
        .send(BackendCommand::TagFile {
            token: InvocationToken::new(2),
            input: TagInput {
                path: "a.md".into(),
                tags: Some(TagList::parse("x, y")),
                analyze: false,
            },
        })
        .expect("queue tag");
    cmd_tx.send(BackendCommand::HealthCheck).expect("queue health");

    let mut seen = Vec::new();
    for _ in 0..3 {
        let event = ui_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("event from worker");
        seen.push(match event {
            UiEvent::MoveResolved { outcome, .. } => {
                format!("move {}", outcome.expect("move ok").destination)
            }
            UiEvent::TagResolved { outcome, .. } => {
                format!("tag {}", outcome.expect("tag ok").tags.join("|"))
            }
            UiEvent::HealthChecked { healthy } => format!("health {healthy}"),
            other => panic!("unexpected event: {other:?}"),
        });
    }
    seen.sort();
    assert_eq!(seen, vec!["health false", "move inbox/a.md", "tag x|y"]);

    drop(cmd_tx);
    worker.join().expect("worker exits once the queue closes");
}

#[test]
fn results_wait_for_room_when_the_ui_queue_is_full() {
    let api = Arc::new(RecordingApi::default());
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(1);
    ui_tx
        .send(UiEvent::HealthChecked { healthy: true })
        .expect("fill ui queue");
    let worker = launch(api.clone(), cmd_rx, ui_tx);

    cmd_tx
        .send(BackendCommand::Search {
            token: InvocationToken::new(9),
            input: SearchInput {
                query: "rust".into(),
                limit: 10,
                filters: None,
            },
        })
        .expect("queue search");

    // The search completes while the queue is still full.
    let deadline = Instant::now() + Duration::from_secs(5);
    while api.calls().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    thread::sleep(Duration::from_millis(50));

    assert!(matches!(
        ui_rx.recv_timeout(Duration::from_secs(5)),
        Ok(UiEvent::HealthChecked { healthy: true })
    ));
    match ui_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("search result after the queue drained")
    {
        UiEvent::SearchResolved { token, outcome } => {
            assert_eq!(token, InvocationToken::new(9));
            assert_eq!(outcome.expect("search ok").results.len(), 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    drop(cmd_tx);
    worker.join().expect("worker exits once the queue closes");
}
