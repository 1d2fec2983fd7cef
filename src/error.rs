use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use reqwest::StatusCode as UpstreamStatus;
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Failure to retrieve the article page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Fetching the URL timed out")]
    Timeout,

    #[error("Failed to fetch URL. Status: {}", .status.as_u16())]
    Status { status: UpstreamStatus },

    #[error("Failed to fetch URL: {0}")]
    Transport(String),

    #[error("Failed to read the response body: {0}")]
    Body(String),
}

impl FetchError {
    /// Upstream HTTP status, when the page answered at all.
    pub fn status(&self) -> Option<UpstreamStatus> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status { status }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// The page was fetched but no article text could be isolated.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("The page is empty")]
    EmptyDocument,

    #[error("Could not parse the article content to summarize ({chars} characters of text found, {min} required)")]
    NoContent { chars: usize, min: usize },
}

/// The text-generation backend failed at the transport or auth level.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model backend rejected the credentials (status {status})")]
    Auth { status: u16 },

    #[error("Model backend quota exhausted")]
    Quota,

    #[error("Model backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Model backend timed out")]
    Timeout,

    #[error("Could not reach the model backend: {0}")]
    Transport(String),

    #[error("Invalid response format from model backend: {0}")]
    InvalidResponse(String),

    #[error("Model backend returned an empty completion")]
    EmptyCompletion,
}

impl ModelError {
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }

    pub fn from_status(status: UpstreamStatus, message: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth { status: status.as_u16() },
            429 => Self::Quota,
            code => Self::Status { status: code, message },
        }
    }
}

/// The model answered, but not with a well-formed summary.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Model output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Model output is not a JSON object")]
    NotAnObject,

    #[error("Model output is missing field `{0}`")]
    MissingField(String),

    #[error("Field `{field}` must be {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("Field `{0}` must not be empty")]
    EmptyField(String),
}

impl SchemaError {
    /// Name of the offending field, for field-level failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField(field) | Self::EmptyField(field) => Some(field),
            Self::WrongType { field, .. } => Some(field),
            Self::InvalidJson(_) | Self::NotAnObject => None,
        }
    }
}

/// A failed pipeline run, tagged with the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Extraction(_) => "extraction",
            Self::Model(_) => "model",
            Self::Schema(_) => "schema",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to summarize the article. {0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    InvalidRequest(String),

    /// The whole request outlived the transport-level bound. Stage timeouts
    /// arrive as `FetchError::Timeout` / `ModelError::Timeout` instead.
    #[error("Request processing timed out")]
    Timeout,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Pipeline(PipelineError::Fetch(
                FetchError::InvalidUrl(_) | FetchError::UnsupportedScheme(_),
            )) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(PipelineError::Fetch(FetchError::Timeout)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Pipeline(PipelineError::Model(ModelError::Timeout)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Pipeline(PipelineError::Fetch(_)) => StatusCode::BAD_GATEWAY,
            AppError::Pipeline(PipelineError::Model(_)) => StatusCode::BAD_GATEWAY,
            AppError::Pipeline(PipelineError::Extraction(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Pipeline(PipelineError::Schema(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
