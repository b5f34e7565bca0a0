// Route handlers
//
// Fields are accepted from an urlencoded body or the query string; the body
// wins when both carry the same field. A body that is not urlencoded falls
// back to the query string. One that is urlencoded but does not decode (for
// example `mode` and `type` both set) is a 400.

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::{Form, Json};
use serde::Deserialize;

use super::dto::{MediaSummary, ServiceInfo};
use super::error::HttpError;
use super::state::AppState;
use super::transfer::AttachmentSink;
use crate::downloader::DownloadRequest;

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    pub url: Option<String>,
    /// `video` or `audio`. Older clients send it as `type`.
    #[serde(alias = "type")]
    pub mode: Option<String>,
    pub resolution: Option<String>,
}

impl DownloadForm {
    fn or(self, other: DownloadForm) -> DownloadForm {
        DownloadForm {
            url: self.url.or(other.url),
            mode: self.mode.or(other.mode),
            resolution: self.resolution.or(other.resolution),
        }
    }
}

fn merge(
    body: Result<Form<DownloadForm>, FormRejection>,
    query: Result<Query<DownloadForm>, QueryRejection>,
) -> Result<DownloadForm, HttpError> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::warn!(%rejection, "rejecting malformed query string");
            return Err(HttpError::BadRequest(rejection.body_text()));
        }
    };

    match body {
        Ok(Form(body)) => Ok(body.or(query)),
        Err(FormRejection::InvalidFormContentType(_)) => Ok(query),
        Err(rejection) => {
            tracing::warn!(%rejection, "rejecting malformed form body");
            Err(HttpError::BadRequest(rejection.body_text()))
        }
    }
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Json<ServiceInfo> {
    let settings = state.orchestrator.settings();
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        provider: state.orchestrator.provider_name(),
        endpoints: vec!["GET /", "POST /download", "POST /info"],
        ladder: settings.ladder.tiers().to_vec(),
        max_size_bytes: settings.max_bytes,
    })
}

/// `POST /download`: the selected stream as an attachment.
pub async fn download(
    State(state): State<AppState>,
    query: Result<Query<DownloadForm>, QueryRejection>,
    body: Result<Form<DownloadForm>, FormRejection>,
) -> Result<Response, HttpError> {
    let form = merge(body, query)?;
    let request = DownloadRequest::parse(
        form.url.as_deref(),
        form.mode.as_deref(),
        form.resolution.as_deref(),
        &state.orchestrator.settings().ladder,
    )?;

    let response = state.orchestrator.deliver(&request, &AttachmentSink).await?;
    Ok(response)
}

/// `POST /info`: what is available and what a download would pick.
pub async fn info(
    State(state): State<AppState>,
    query: Result<Query<DownloadForm>, QueryRejection>,
    body: Result<Form<DownloadForm>, FormRejection>,
) -> Result<Json<MediaSummary>, HttpError> {
    let form = merge(body, query)?;
    let descriptor = state.orchestrator.describe(form.url.as_deref()).await?;
    Ok(Json(MediaSummary::new(
        &descriptor,
        &state.orchestrator.settings().ladder,
    )))
}
