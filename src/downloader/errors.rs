// Error types for the download pipeline
//
// `Display` carries the internal detail and is meant for logs only.
// Callers get `user_message()`, which never includes provider output or paths.

use thiserror::Error;

use super::extractors::ProviderFailure;
use super::models::Mode;

const MIB: f64 = 1_048_576.0;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Missing/malformed URL or unsupported mode
    #[error("invalid request: {0}")]
    Input(String),

    /// The provider could not describe the media
    #[error("provider failed ({reason:?}): {detail}")]
    Provider {
        reason: ProviderFailure,
        detail: String,
    },

    /// No candidate matches the requested mode
    #[error("no {mode} stream available")]
    Selection { mode: Mode },

    /// Chosen candidate is larger than the configured threshold
    #[error("stream size {size_bytes} bytes exceeds limit of {limit_bytes} bytes")]
    SizeLimit { size_bytes: u64, limit_bytes: u64 },

    /// Could not allocate the per-request directory
    #[error("workspace allocation failed: {0}")]
    Workspace(#[source] std::io::Error),

    /// Byte transfer failed (provider retrieval or handoff)
    #[error("transfer failed: {0}")]
    Transfer(String),
}

impl DownloadError {
    pub fn provider(reason: ProviderFailure, detail: impl Into<String>) -> Self {
        Self::Provider {
            reason,
            detail: detail.into(),
        }
    }

    pub fn transfer(detail: impl Into<String>) -> Self {
        Self::Transfer(detail.into())
    }

    /// Message safe to show to the person who made the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(msg) => msg.clone(),
            Self::Provider { reason, .. } => reason.user_message().to_string(),
            Self::Selection { mode: Mode::Audio } => "No audio streams available.".to_string(),
            Self::Selection { mode: Mode::Video } => {
                "No playable video streams available.".to_string()
            }
            Self::SizeLimit {
                size_bytes,
                limit_bytes,
            } => format!(
                "The selected stream is {:.1} MiB, which exceeds the {:.1} MiB limit. \
                 Pick a lower resolution or audio-only mode.",
                *size_bytes as f64 / MIB,
                *limit_bytes as f64 / MIB
            ),
            Self::Workspace(_) => {
                "The server could not prepare the download. Please try again later.".to_string()
            }
            Self::Transfer(_) => "Error downloading the media. Please try again.".to_string(),
        }
    }
}
