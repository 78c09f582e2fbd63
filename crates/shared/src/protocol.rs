use serde::{Deserialize, Serialize};

use crate::domain::{MocKind, MocTarget, TagList};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub path: String,
    pub excerpt: String,
    pub relevance: f64,
}

impl SearchHit {
    /// Relevance as a whole percentage, rounded to the nearest percent.
    pub fn relevance_percent(&self) -> i64 {
        (self.relevance * 100.0).round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub context_size: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSource {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub context: Vec<ContextSource>,
    #[serde(default)]
    pub followup_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub source: String,
    pub analyze: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl MoveRequest {
    /// In analyze mode the service picks the destination, so a supplied one is dropped.
    pub fn new(source: impl Into<String>, destination: Option<String>, analyze: bool) -> Self {
        Self {
            source: source.into(),
            analyze,
            destination: if analyze { None } else { destination },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub message: String,
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MocRequest {
    #[serde(rename = "type")]
    pub kind: MocKind,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl MocRequest {
    /// Only the parameter field matching the target kind is populated.
    pub fn new(target: &MocTarget, file_path: impl Into<String>) -> Self {
        let mut request = Self {
            kind: target.kind(),
            file_path: file_path.into(),
            topic: None,
            folder: None,
            tag: None,
        };
        let value = Some(target.value().to_string());
        match target {
            MocTarget::Topic(_) => request.topic = value,
            MocTarget::Folder(_) => request.folder = value,
            MocTarget::Tag(_) => request.tag = value,
        }
        request
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MocResponse {
    pub file_path: String,
    pub included_files: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRequest {
    pub path: String,
    pub analyze: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TagRequest {
    /// In analyze mode the service infers tags, so supplied ones are dropped.
    pub fn new(path: impl Into<String>, tags: Option<TagList>, analyze: bool) -> Self {
        Self {
            path: path.into(),
            analyze,
            tags: if analyze {
                None
            } else {
                tags.map(TagList::into_vec)
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResponse {
    pub message: String,
    pub path: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
