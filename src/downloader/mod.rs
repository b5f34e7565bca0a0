// Downloader module - stream selection and download orchestration

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod naming;
pub mod orchestrator;
pub mod size_guard;
pub mod traits;
pub mod utils;
pub mod workspace;

pub use errors::DownloadError;
pub use extractors::{ExtractorConfig, ProviderFailure, YtDlpProvider};
pub use format_selector::FormatSelector;
pub use models::{
    DownloadJob, DownloadRequest, DownloadSettings, MediaDescriptor, Mode, ResolutionIntent,
    ResolutionLadder, ResolutionTier, SelectionRequest, StreamCandidate, StreamKind,
};
pub use orchestrator::{Orchestrator, Stage};
pub use size_guard::SizeGuard;
pub use traits::{MediaProvider, TransferSink};
pub use workspace::Workspace;
