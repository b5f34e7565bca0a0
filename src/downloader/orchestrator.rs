// Orchestrator - one download request from URL to handed-off file
//
// Init → DescriptorFetched → StreamSelected → SizeChecked → Downloaded
//      → TransferHandedOff → CleanedUp
// Any failing step moves to Errored and then to CleanedUp. The workspace is
// owned by the in-flight job, so every early return removes it.

use std::path::Path;
use std::sync::Arc;

use time::OffsetDateTime;

use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::{
    validate_url, DownloadJob, DownloadRequest, DownloadSettings, MediaDescriptor, Mode,
    StreamCandidate, VIDEO_CONTAINER,
};
use super::naming;
use super::size_guard::SizeGuard;
use super::traits::{MediaProvider, TransferSink};
use super::workspace::Workspace;

/// Lifecycle of one request.
///
/// On failure the tracker records `Errored` then `CleanedUp` before returning.
/// On success the tracker stops at `TransferHandedOff`: the job now belongs to
/// the sink, and `CleanedUp` happens when the sink drops it (the workspace
/// logs its own removal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    DescriptorFetched,
    StreamSelected,
    SizeChecked,
    Downloaded,
    TransferHandedOff,
    CleanedUp,
    Errored,
}

/// Records where a request is, for logs.
#[derive(Debug)]
struct StageTracker {
    stage: Stage,
}

impl StageTracker {
    fn new() -> Self {
        Self { stage: Stage::Init }
    }

    fn advance(&mut self, next: Stage) {
        tracing::debug!(from = ?self.stage, to = ?next, "download stage");
        self.stage = next;
    }

    /// Called after the job (and its workspace) has already been dropped.
    fn fail(&mut self, err: DownloadError) -> DownloadError {
        tracing::warn!(stage = ?self.stage, error = %err, "download failed");
        self.advance(Stage::Errored);
        self.advance(Stage::CleanedUp);
        err
    }
}

pub struct Orchestrator {
    provider: Arc<dyn MediaProvider>,
    settings: Arc<DownloadSettings>,
    size_guard: SizeGuard,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn MediaProvider>, settings: Arc<DownloadSettings>) -> Self {
        let size_guard = SizeGuard::new(settings.max_bytes);
        Self {
            provider,
            settings,
            size_guard,
        }
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fetch the descriptor only (no selection, no workspace).
    pub async fn describe(&self, url: Option<&str>) -> Result<MediaDescriptor, DownloadError> {
        let url = validate_url(url)?;
        self.provider.fetch(&url).await
    }

    /// Run every step up to a file on disk. The caller owns the returned job.
    pub async fn prepare(&self, request: &DownloadRequest) -> Result<DownloadJob, DownloadError> {
        let mut stages = StageTracker::new();
        match self.run_steps(request, &mut stages).await {
            Ok(job) => Ok(job),
            Err(e) => Err(stages.fail(e)),
        }
    }

    /// Full lifecycle: prepare, then hand the job to `sink`.
    pub async fn deliver<S: TransferSink>(
        &self,
        request: &DownloadRequest,
        sink: &S,
    ) -> Result<S::Output, DownloadError> {
        let mut stages = StageTracker::new();
        let job = match self.run_steps(request, &mut stages).await {
            Ok(job) => job,
            Err(e) => return Err(stages.fail(e)),
        };

        match sink.hand_off(job).await {
            Ok(output) => {
                stages.advance(Stage::TransferHandedOff);
                Ok(output)
            }
            Err(e) => Err(stages.fail(e)),
        }
    }

    async fn run_steps(
        &self,
        request: &DownloadRequest,
        stages: &mut StageTracker,
    ) -> Result<DownloadJob, DownloadError> {
        let mode = request.selection.mode;
        tracing::info!(
            url = %request.url,
            %mode,
            intent = %request.selection.intent,
            provider = self.provider.name(),
            "download requested"
        );

        let descriptor = self.provider.fetch(&request.url).await?;
        stages.advance(Stage::DescriptorFetched);

        let candidate =
            FormatSelector::select(&descriptor, &request.selection, &self.settings.ladder)?;
        tracing::info!(
            format_id = candidate.handle.format_id(),
            tier = ?candidate.tier(),
            fps = ?candidate.fps,
            abr = ?candidate.abr,
            size = ?candidate.effective_size(),
            "stream selected"
        );
        stages.advance(Stage::StreamSelected);

        self.size_guard.check(candidate)?;
        stages.advance(Stage::SizeChecked);

        let workspace = Workspace::acquire(self.settings.workspace_root.as_deref())
            .map_err(DownloadError::Workspace)?;

        let extension = naming::extension_for(mode, candidate);
        let filename = naming::build_filename(
            &descriptor.title,
            &self.settings.fallback_name,
            extension,
            OffsetDateTime::now_utc(),
        );

        let file_path = self
            .provider
            .retrieve(candidate, workspace.path(), &filename)
            .await?;
        ensure_inside(&file_path, workspace.path())?;
        stages.advance(Stage::Downloaded);

        Ok(DownloadJob {
            content_type: content_type(mode, candidate),
            workspace,
            filename,
            file_path,
        })
    }
}

fn content_type(mode: Mode, candidate: &StreamCandidate) -> String {
    match mode {
        Mode::Video => format!("video/{}", VIDEO_CONTAINER),
        Mode::Audio if candidate.mime_type.is_empty() => "application/octet-stream".to_string(),
        Mode::Audio => candidate.mime_type.clone(),
    }
}

fn ensure_inside(file_path: &Path, workspace: &Path) -> Result<(), DownloadError> {
    if file_path.is_absolute() && file_path.starts_with(workspace) {
        Ok(())
    } else {
        Err(DownloadError::transfer(format!(
            "provider returned {} outside workspace {}",
            file_path.display(),
            workspace.display()
        )))
    }
}
