// Streams a finished job to the HTTP client as an attachment

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;

use crate::downloader::{DownloadError, DownloadJob, TransferSink};

/// Hands the job to the response body.
///
/// The job, and with it the workspace, moves into the body stream. The
/// directory is removed once the body has been fully sent or dropped.
pub struct AttachmentSink;

#[async_trait]
impl TransferSink for AttachmentSink {
    type Output = Response;

    async fn hand_off(&self, job: DownloadJob) -> Result<Response, DownloadError> {
        let file = tokio::fs::File::open(&job.file_path).await.map_err(|e| {
            DownloadError::transfer(format!("open {}: {}", job.file_path.display(), e))
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| DownloadError::transfer(format!("stat {}: {}", job.file_path.display(), e)))?
            .len();

        let headers = attachment_headers(&job.filename, &job.content_type, length)?;
        tracing::info!(filename = %job.filename, bytes = length, "streaming attachment");

        // The closure owns the job; it lives as long as the stream does.
        let stream = ReaderStream::new(file).map(move |chunk| {
            let _held = &job;
            chunk
        });

        Ok((headers, Body::from_stream(stream)).into_response())
    }
}

fn attachment_headers(
    filename: &str,
    content_type: &str,
    length: u64,
) -> Result<HeaderMap, DownloadError> {
    let value = |raw: String| {
        HeaderValue::from_str(&raw)
            .map_err(|e| DownloadError::transfer(format!("invalid header value {:?}: {}", raw, e)))
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, value(content_type.to_string())?);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(CONTENT_DISPOSITION, value(content_disposition(filename))?);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(headers)
}

/// `attachment` with an ASCII `filename` and an RFC 5987 `filename*`.
pub fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(filename)
    )
}
