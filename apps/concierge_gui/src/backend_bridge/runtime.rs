//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::ConciergeApi;
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorContext, UiEvent},
};

/// Starts the backend worker. Every command runs as its own task, so
/// overlapping invocations of one feature really overlap.
pub fn launch(
    api: Arc<dyn ConciergeApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };
        tracing::info!("backend worker ready");

        while let Ok(cmd) = cmd_rx.recv() {
            let api = Arc::clone(&api);
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                let command = cmd.name();
                let event = execute(api.as_ref(), cmd).await;
                deliver(ui_tx, command, event).await;
            });
        }
        tracing::info!("backend command queue closed; worker exiting");
    })
}

/// Hands `event` to the UI thread. A full queue is waited out on the blocking
/// pool; every resolution must reach its feature.
async fn deliver(ui_tx: Sender<UiEvent>, command: &'static str, event: UiEvent) {
    let event = match ui_tx.try_send(event) {
        Ok(()) => {
            tracing::debug!(command, "queued backend->ui event");
            return;
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!(command, "ui event queue closed; dropping result");
            return;
        }
        Err(TrySendError::Full(event)) => event,
    };
    tracing::warn!(command, "ui event queue is full; waiting for room");
    match tokio::task::spawn_blocking(move || ui_tx.send(event)).await {
        Ok(Ok(())) => tracing::debug!(command, "queued backend->ui event"),
        Ok(Err(_)) => tracing::debug!(command, "ui event queue closed; dropping result"),
        Err(err) => tracing::error!(command, "ui event delivery task failed: {err}"),
    }
}

/// Runs one command against the service and converts the outcome into the
/// event the UI thread applies.
pub async fn execute(api: &dyn ConciergeApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::Search { token, input } => UiEvent::SearchResolved {
            token,
            outcome: api.search(&input.query, input.limit, input.filters).await,
        },
        BackendCommand::Ask { token, input } => UiEvent::AskResolved {
            token,
            outcome: api
                .ask_question(&input.question, input.context_size, input.temperature)
                .await,
        },
        BackendCommand::MoveFile { token, input } => UiEvent::MoveResolved {
            token,
            outcome: api
                .move_file(&input.source, input.destination.as_deref(), input.analyze)
                .await,
        },
        BackendCommand::GenerateMoc { token, input } => UiEvent::MocResolved {
            token,
            outcome: api.generate_moc(&input.target, &input.file_path).await,
        },
        BackendCommand::TagFile { token, input } => UiEvent::TagResolved {
            token,
            outcome: api.tag_file(&input.path, input.tags, input.analyze).await,
        },
        BackendCommand::HealthCheck => UiEvent::HealthChecked {
            healthy: api.health_check().await,
        },
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
