use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced a response (unreachable host, timeout, reset).
    Transport,
    /// The service answered with a status outside the success range.
    Status,
    /// A success response whose body did not match the expected shape.
    Decode,
}

/// Uniform failure of every API operation except the health check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    status: Option<u16>,
    message: String,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            status: None,
            message: message.into(),
        }
    }

    pub fn status(status: u16, detail: Option<String>) -> Self {
        let message = match detail {
            Some(detail) => format!("API error: {status} ({detail})"),
            None => format!("API error: {status}"),
        };
        Self {
            kind: ApiErrorKind::Status,
            status: Some(status),
            message,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            status: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn http_status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::decode(format!("invalid response payload: {err}"))
        } else if let Some(status) = err.status() {
            ApiError::status(status.as_u16(), None)
        } else {
            ApiError::transport(format!("request failed: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_names_code_and_detail() {
        let err = ApiError::status(500, Some("Search failed: index missing".into()));
        assert_eq!(err.http_status(), Some(500));
        assert_eq!(err.kind(), ApiErrorKind::Status);
        assert_eq!(err.to_string(), "API error: 500 (Search failed: index missing)");
        assert_eq!(ApiError::status(404, None).message(), "API error: 404");
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.http_status(), None);
        assert_eq!(err.kind(), ApiErrorKind::Transport);
    }
}
