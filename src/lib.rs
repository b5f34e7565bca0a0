pub mod config;
pub mod downloader;
pub mod server;

pub use config::AppConfig;
pub use downloader::{DownloadError, MediaProvider, Orchestrator, YtDlpProvider};
pub use server::{router, serve, AppState};
