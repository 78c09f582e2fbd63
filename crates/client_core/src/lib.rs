use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{MocTarget, TagList},
    error::ServiceErrorBody,
    protocol::{
        AskRequest, AskResponse, MocRequest, MocResponse, MoveRequest, MoveResponse,
        SearchFilters, SearchRequest, SearchResponse, TagRequest, TagResponse,
    },
};
use tracing::{debug, error, warn};
use url::Url;

pub mod config;
pub mod error;

pub use config::{load_settings, parse_base_url, ConfigError, Settings};
pub use error::{ApiError, ApiErrorKind};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const DEFAULT_CONTEXT_SIZE: u32 = 3;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Operations of the knowledge-base service. Each call is one request/response
/// round trip; nothing is retried or cached.
#[async_trait]
pub trait ConciergeApi: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        filters: Option<SearchFilters>,
    ) -> Result<SearchResponse, ApiError>;
    async fn ask_question(
        &self,
        question: &str,
        context_size: u32,
        temperature: f64,
    ) -> Result<AskResponse, ApiError>;
    async fn move_file(
        &self,
        source: &str,
        destination: Option<&str>,
        analyze: bool,
    ) -> Result<MoveResponse, ApiError>;
    async fn generate_moc(
        &self,
        target: &MocTarget,
        file_path: &str,
    ) -> Result<MocResponse, ApiError>;
    async fn tag_file(
        &self,
        path: &str,
        tags: Option<TagList>,
        analyze: bool,
    ) -> Result<TagResponse, ApiError>;
    /// True iff the service answers with a success status. Never fails.
    async fn health_check(&self) -> bool;
}

#[derive(Clone)]
pub struct ConciergeClient {
    http: Client,
    base_url: String,
}

impl ConciergeClient {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::transport(format!("failed to build http client: {err}")))?;
        Ok(Self::with_http_client(http, base_url))
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&settings.api_base_url)?;
        Self::new(&base_url, settings.request_timeout()).map_err(|err| {
            ConfigError::InvalidBaseUrl {
                url: settings.api_base_url.clone(),
                reason: err.to_string(),
            }
        })
    }

    pub fn with_http_client(http: Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<Req, Resp>(
        &self,
        operation: &'static str,
        path: &str,
        body: &Req,
    ) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(operation, %url, "sending api request");
        let result = async {
            let response = self.http.post(&url).json(body).send().await?;
            decode_response(response).await
        }
        .await;
        if let Err(err) = &result {
            error!(operation, status = ?err.http_status(), "api request failed: {err}");
        }
        result
    }
}

async fn decode_response<Resp: DeserializeOwned>(response: Response) -> Result<Resp, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<ServiceErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail_text());
        return Err(ApiError::status(status.as_u16(), detail));
    }
    response
        .json::<Resp>()
        .await
        .map_err(|err| ApiError::decode(format!("invalid response payload: {err}")))
}

#[async_trait]
impl ConciergeApi for ConciergeClient {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        filters: Option<SearchFilters>,
    ) -> Result<SearchResponse, ApiError> {
        let request = SearchRequest {
            query: query.to_string(),
            limit,
            filters,
        };
        self.post_json("search", "/search", &request).await
    }

    async fn ask_question(
        &self,
        question: &str,
        context_size: u32,
        temperature: f64,
    ) -> Result<AskResponse, ApiError> {
        let request = AskRequest {
            question: question.to_string(),
            context_size,
            temperature,
        };
        self.post_json("ask", "/ask", &request).await
    }

    async fn move_file(
        &self,
        source: &str,
        destination: Option<&str>,
        analyze: bool,
    ) -> Result<MoveResponse, ApiError> {
        let request = MoveRequest::new(source, destination.map(str::to_string), analyze);
        self.post_json("move_file", "/vault/move", &request).await
    }

    async fn generate_moc(
        &self,
        target: &MocTarget,
        file_path: &str,
    ) -> Result<MocResponse, ApiError> {
        let request = MocRequest::new(target, file_path);
        self.post_json("generate_moc", "/moc", &request).await
    }

    async fn tag_file(
        &self,
        path: &str,
        tags: Option<TagList>,
        analyze: bool,
    ) -> Result<TagResponse, ApiError> {
        let request = TagRequest::new(path, tags, analyze);
        self.post_json("tag_file", "/vault/tag", &request).await
    }

    async fn health_check(&self) -> bool {
        match self.http.get(self.endpoint("/health")).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                if !healthy {
                    warn!(status = response.status().as_u16(), "health check failed");
                }
                healthy
            }
            Err(err) => {
                error!("health check error: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
