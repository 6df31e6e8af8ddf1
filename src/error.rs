use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Domain-specific error kinds for the ad placement & composition pipeline.
///
/// Each variant corresponds to one row of the error-kind table: a source
/// stage, a propagation policy, and an HTTP status when it surfaces on the
/// API boundary.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid subtitles: {0}")]
    InvalidSubtitles(String),

    #[error("no candidate placements returned")]
    NoCandidates,

    #[error("oracle response could not be parsed: {0}")]
    OracleParse(String),

    #[error("oracle unreachable: {0}")]
    OracleUnreachable(String),

    #[error("upload to all ephemeral hosts failed: {0}")]
    UploadFailed(String),

    #[error("generation timed out after {0:.1}s")]
    GenerationTimeout(f64),

    #[error("generation provider unreachable: {0}")]
    GenerationUnreachable(String),

    #[error("incompatible streams: {0}")]
    IncompatibleStreams(String),

    #[error("job was cancelled")]
    Cancelled,

    #[error("job not found")]
    JobNotFound,

    #[error("forbidden: caller does not own this job")]
    Forbidden,

    #[error("segment not found")]
    SegmentNotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Stable machine-readable kind string, as carried on `job.error.kind`
    /// and returned in the `detail` field of status responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid-input",
            Self::InvalidSubtitles(_) => "invalid-subtitles",
            Self::NoCandidates => "no-candidates",
            Self::OracleParse(_) => "oracle-parse",
            Self::OracleUnreachable(_) => "oracle-unreachable",
            Self::UploadFailed(_) => "upload-failed",
            Self::GenerationTimeout(_) => "generation-timeout",
            Self::GenerationUnreachable(_) => "generation-unreachable",
            Self::IncompatibleStreams(_) => "incompatible-streams",
            Self::Cancelled => "cancelled",
            Self::JobNotFound => "not-found",
            Self::Forbidden => "forbidden",
            Self::SegmentNotFound => "not-found",
            Self::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSubtitles(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NoCandidates => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OracleParse(_) => StatusCode::BAD_GATEWAY,
            Self::OracleUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::UploadFailed(_) => StatusCode::BAD_GATEWAY,
            Self::GenerationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::GenerationUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::IncompatibleStreams(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Cancelled => StatusCode::CONFLICT,
            Self::JobNotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::SegmentNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY => {
                tracing::error!(kind = self.kind(), "{}", self);
            }
            _ => {
                tracing::warn!(kind = self.kind(), "{}", self);
            }
        }

        let body = Json(json!({
            "detail": self.kind(),
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Internal(format!("http client error: {e}"))
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Internal(format!("io error: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
