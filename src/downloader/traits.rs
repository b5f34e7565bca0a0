// Collaborator seams for the orchestrator

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{DownloadJob, MediaDescriptor, StreamCandidate};

/// Talks to the remote media platform
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Name of the provider (for logging)
    fn name(&self) -> &'static str;

    /// Describe the media behind `url`. Fails with `DownloadError::Provider`.
    async fn fetch(&self, url: &str) -> Result<MediaDescriptor, DownloadError>;

    /// Write `candidate` to `dir/filename` and return the absolute path.
    /// Fails with `DownloadError::Transfer`.
    async fn retrieve(
        &self,
        candidate: &StreamCandidate,
        dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, DownloadError>;
}

/// Delivers a finished job to the caller.
///
/// The sink takes ownership of the job (and its workspace); whatever keeps the
/// job alive decides when the workspace disappears.
#[async_trait]
pub trait TransferSink: Send + Sync {
    type Output: Send;

    async fn hand_off(&self, job: DownloadJob) -> Result<Self::Output, DownloadError>;
}
