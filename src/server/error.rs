// HTTP error mapping
//
// Only `DownloadError::user_message()` reaches the body. Internal detail has
// already been logged by the pipeline.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::downloader::DownloadError;

#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No stream matches the request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Selected stream exceeds the size threshold.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Upstream platform or transfer failure.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            HttpError::BadRequest(msg)
            | HttpError::NotFound(msg)
            | HttpError::PayloadTooLarge(msg)
            | HttpError::BadGateway(msg)
            | HttpError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message().to_string(),
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<DownloadError> for HttpError {
    fn from(err: DownloadError) -> Self {
        tracing::debug!(error = %err, "mapping download error to response");
        let message = err.user_message();
        match err {
            DownloadError::Input(_) => HttpError::BadRequest(message),
            DownloadError::Selection { .. } => HttpError::NotFound(message),
            DownloadError::SizeLimit { .. } => HttpError::PayloadTooLarge(message),
            DownloadError::Provider { .. } | DownloadError::Transfer(_) => {
                HttpError::BadGateway(message)
            }
            DownloadError::Workspace(_) => HttpError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::{Mode, ProviderFailure};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DownloadError::Input("Please enter a video URL.".into()), 400),
            (DownloadError::Selection { mode: Mode::Audio }, 404),
            (
                DownloadError::SizeLimit {
                    size_bytes: 200,
                    limit_bytes: 100,
                },
                413,
            ),
            (
                DownloadError::provider(ProviderFailure::RateLimited, "HTTP Error 429"),
                502,
            ),
            (DownloadError::transfer("disk full"), 502),
            (
                DownloadError::Workspace(std::io::Error::other("read-only fs")),
                500,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status().as_u16(), expected);
        }
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = HttpError::from(DownloadError::provider(
            ProviderFailure::Unknown,
            "ERROR: /home/svc/.cache/yt-dlp exploded",
        ));
        assert!(!err.message().contains("/home/svc"));
        assert!(!err.message().contains("exploded"));

        let err = HttpError::from(DownloadError::transfer("/tmp/tube-grab-x/clip.mp4 vanished"));
        assert!(!err.message().contains("/tmp"));
    }
}
