//! Backend commands queued from UI to backend worker.

use shared::{
    domain::{MocTarget, TagList},
    protocol::SearchFilters,
};

use crate::controller::orchestration::InvocationToken;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchInput {
    pub query: String,
    pub limit: u32,
    pub filters: Option<SearchFilters>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AskInput {
    pub question: String,
    pub context_size: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveInput {
    pub source: String,
    pub destination: Option<String>,
    pub analyze: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MocInput {
    pub target: MocTarget,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInput {
    pub path: String,
    pub tags: Option<TagList>,
    pub analyze: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    Search {
        token: InvocationToken,
        input: SearchInput,
    },
    Ask {
        token: InvocationToken,
        input: AskInput,
    },
    MoveFile {
        token: InvocationToken,
        input: MoveInput,
    },
    GenerateMoc {
        token: InvocationToken,
        input: MocInput,
    },
    TagFile {
        token: InvocationToken,
        input: TagInput,
    },
    HealthCheck,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Search { .. } => "search",
            BackendCommand::Ask { .. } => "ask",
            BackendCommand::MoveFile { .. } => "move_file",
            BackendCommand::GenerateMoc { .. } => "generate_moc",
            BackendCommand::TagFile { .. } => "tag_file",
            BackendCommand::HealthCheck => "health_check",
        }
    }
}
