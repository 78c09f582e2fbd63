//! Command orchestration from UI actions to the backend command queue, and the
//! request lifecycle shared by every feature.

use client_core::ApiError;
use crossbeam_channel::{Sender, TrySendError};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorContext, UiEvent},
    ui::document::{Document, NodeId},
};

/// Queues `cmd` for the backend worker. A refused command is handed back after
/// the reason has been recorded in `status`.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut Option<UiError>,
) -> Option<BackendCommand> {
    let cmd_name = cmd.name();
    let (cmd, message) = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            return None;
        }
        Err(TrySendError::Full(cmd)) => (cmd, "UI command queue is full; please retry"),
        Err(TrySendError::Disconnected(cmd)) => (
            cmd,
            "Backend command processor disconnected (possible startup/runtime failure); restart the app",
        ),
    };
    let err = UiError::from_message(UiErrorContext::CommandQueue, message);
    tracing::warn!(command = cmd_name, category = ?err.category(), "{message}");
    *status = Some(err);
    Some(cmd)
}

/// The resolution a command that never reached the backend settles with.
/// `None` for commands no feature is waiting on.
pub fn refused_outcome(cmd: BackendCommand, error: ApiError) -> Option<UiEvent> {
    match cmd {
        BackendCommand::Search { token, .. } => Some(UiEvent::SearchResolved {
            token,
            outcome: Err(error),
        }),
        BackendCommand::Ask { token, .. } => Some(UiEvent::AskResolved {
            token,
            outcome: Err(error),
        }),
        BackendCommand::MoveFile { token, .. } => Some(UiEvent::MoveResolved {
            token,
            outcome: Err(error),
        }),
        BackendCommand::GenerateMoc { token, .. } => Some(UiEvent::MocResolved {
            token,
            outcome: Err(error),
        }),
        BackendCommand::TagFile { token, .. } => Some(UiEvent::TagResolved {
            token,
            outcome: Err(error),
        }),
        BackendCommand::HealthCheck => None,
    }
}

/// Identifier of one issued request. Later invocations always compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvocationToken(u64);

impl InvocationToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Validating,
    Loading,
    Succeeded,
    Failed,
}

/// Lifecycle of one feature's requests. `result` is only present when
/// `Succeeded` and `error` only when `Failed`.
#[derive(Debug, Clone)]
pub struct RequestState<T> {
    status: RequestStatus,
    result: Option<T>,
    error: Option<ApiError>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            result: None,
            error: None,
        }
    }
}

impl<T> RequestState<T> {
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    #[cfg(test)]
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    fn transition(&mut self, status: RequestStatus) {
        self.status = status;
        self.result = None;
        self.error = None;
    }

    fn succeed(&mut self, result: T) {
        self.transition(RequestStatus::Succeeded);
        self.result = Some(result);
    }

    fn fail(&mut self, error: ApiError) {
        self.transition(RequestStatus::Failed);
        self.error = Some(error);
    }
}

/// The two regions every feature drives through a request.
#[derive(Debug, Clone, Copy)]
pub struct Regions {
    pub loading: NodeId,
    pub result: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation<R> {
    pub token: InvocationToken,
    pub request: R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

/// What varies between features: input gathering, rendering and the command
/// that carries the request to the backend.
pub trait Feature {
    type Request: Clone;
    type Response: Clone;

    fn name(&self) -> &'static str;
    fn regions(&self) -> Regions;
    /// Reads the required fields. `None` aborts the invocation silently.
    fn validate(&self, doc: &Document) -> Option<Self::Request>;
    fn render_success(
        &mut self,
        doc: &mut Document,
        request: &Self::Request,
        response: &Self::Response,
    );
    fn render_error(&mut self, doc: &mut Document, request: &Self::Request, error: &ApiError);
    fn command(&self, token: InvocationToken, request: Self::Request) -> BackendCommand;
}

pub struct Orchestrator<F: Feature> {
    feature: F,
    state: RequestState<F::Response>,
    next_token: u64,
    in_flight: Option<Invocation<F::Request>>,
}

impl<F: Feature> Orchestrator<F> {
    pub fn new(feature: F) -> Self {
        Self {
            feature,
            state: RequestState::default(),
            next_token: 1,
            in_flight: None,
        }
    }

    pub fn feature(&self) -> &F {
        &self.feature
    }

    pub fn feature_mut(&mut self) -> &mut F {
        &mut self.feature
    }

    pub fn state(&self) -> &RequestState<F::Response> {
        &self.state
    }

    #[cfg(test)]
    pub fn latest_token(&self) -> Option<InvocationToken> {
        (self.next_token > 1).then(|| InvocationToken::new(self.next_token - 1))
    }

    /// Starts a new invocation. Returns the command to queue, or `None` when a
    /// required field is empty, in which case nothing rendered changes and an
    /// earlier invocation still in flight keeps loading.
    pub fn submit(&mut self, doc: &mut Document) -> Option<BackendCommand> {
        self.state.transition(RequestStatus::Validating);
        let Some(request) = self.feature.validate(doc) else {
            let status = if self.in_flight.is_some() {
                RequestStatus::Loading
            } else {
                RequestStatus::Idle
            };
            self.state.transition(status);
            tracing::debug!(feature = self.feature.name(), "required input missing; not sent");
            return None;
        };

        let token = InvocationToken::new(self.next_token);
        self.next_token += 1;

        let regions = self.feature.regions();
        doc.hide(regions.result);
        doc.show(regions.loading);
        self.state.transition(RequestStatus::Loading);
        self.in_flight = Some(Invocation {
            token,
            request: request.clone(),
        });
        tracing::debug!(
            feature = self.feature.name(),
            token = token.value(),
            "request issued"
        );
        Some(self.feature.command(token, request))
    }

    /// Applies a backend outcome. Only the latest issued invocation renders;
    /// anything older is dropped.
    pub fn resolve(
        &mut self,
        doc: &mut Document,
        token: InvocationToken,
        outcome: Result<F::Response, ApiError>,
    ) -> Resolution {
        let invocation = match self.in_flight.take() {
            Some(invocation) if invocation.token == token => invocation,
            other => {
                self.in_flight = other;
                tracing::debug!(
                    feature = self.feature.name(),
                    token = token.value(),
                    "discarding stale response"
                );
                return Resolution::Stale;
            }
        };

        let regions = self.feature.regions();
        doc.hide(regions.loading);
        doc.show(regions.result);
        match outcome {
            Ok(response) => {
                self.state.succeed(response);
                if let Some(response) = &self.state.result {
                    self.feature
                        .render_success(doc, &invocation.request, response);
                }
            }
            Err(err) => {
                tracing::warn!(
                    feature = self.feature.name(),
                    status = ?err.http_status(),
                    "request failed: {err}"
                );
                self.state.fail(err);
                if let Some(err) = &self.state.error {
                    self.feature.render_error(doc, &invocation.request, err);
                }
            }
        }
        Resolution::Applied
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
