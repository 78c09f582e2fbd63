//! UI/backend events and error modeling for the concierge controller.

use client_core::ApiError;
use shared::protocol::{AskResponse, MocResponse, MoveResponse, SearchResponse, TagResponse};

use crate::controller::orchestration::InvocationToken;

#[derive(Debug)]
pub enum UiEvent {
    Error(UiError),
    HealthChecked {
        healthy: bool,
    },
    SearchResolved {
        token: InvocationToken,
        outcome: Result<SearchResponse, ApiError>,
    },
    AskResolved {
        token: InvocationToken,
        outcome: Result<AskResponse, ApiError>,
    },
    MoveResolved {
        token: InvocationToken,
        outcome: Result<MoveResponse, ApiError>,
    },
    MocResolved {
        token: InvocationToken,
        outcome: Result<MocResponse, ApiError>,
    },
    TagResolved {
        token: InvocationToken,
        outcome: Result<TagResponse, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Service,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    CommandQueue,
    HealthCheck,
}

pub const API_UNREACHABLE_MESSAGE: &str =
    "Cannot reach the API server. Make sure the server is running.";

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("cannot reach")
            || message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnected")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("api error") {
            UiErrorCategory::Service
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn api_unreachable() -> Self {
        Self::from_message(UiErrorContext::HealthCheck, API_UNREACHABLE_MESSAGE)
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
