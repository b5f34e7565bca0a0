// CLI provider - uses native `yt-dlp` binary
//
// One child process per call. `kill_on_drop` ties the child to the request:
// when the caller goes away mid-transfer the process is stopped.

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use async_trait::async_trait;

use super::config::ExtractorConfig;
use super::diagnostics::{diagnose_error, error_excerpt, ProviderFailure};
use super::parser::parse_descriptor;
use crate::downloader::errors::DownloadError;
use crate::downloader::models::{MediaDescriptor, StreamCandidate};
use crate::downloader::traits::MediaProvider;
use crate::downloader::utils::{run_output_with_timeout, CommandError};

/// yt-dlp backed media provider
pub struct YtDlpProvider {
    ytdlp_path: String,
    config: ExtractorConfig,
}

impl YtDlpProvider {
    pub fn new(config: ExtractorConfig) -> Self {
        let ytdlp_path = config.ytdlp_path.clone().unwrap_or_else(Self::find_ytdlp);
        tracing::debug!(path = %ytdlp_path, "using yt-dlp binary");
        Self { ytdlp_path, config }
    }

    pub fn ytdlp_path(&self) -> &str {
        &self.ytdlp_path
    }

    /// Find yt-dlp binary
    fn find_ytdlp() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac, pip --user on some distros
            "/usr/bin/yt-dlp",          // System installation
        ];

        for path in common_paths {
            if Path::new(path).exists() {
                return path.to_string();
            }
        }

        // Try to find via `which`
        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    fn fetch_args(&self, url: &str) -> Vec<String> {
        let mut args = vec!["--dump-json".to_string()];
        args.extend(self.config.common_args());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    fn retrieve_args(&self, format_id: &str, output: &Path, url: &str) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            format_id.to_string(),
            "--no-part".to_string(),
            "--no-progress".to_string(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
        ];
        args.extend(self.config.common_args());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

fn provider_error(err: CommandError) -> DownloadError {
    match err {
        CommandError::NotFound { program } => DownloadError::provider(
            ProviderFailure::ToolMissing,
            format!("{} not found", program),
        ),
        CommandError::TimedOut(secs) => DownloadError::provider(
            ProviderFailure::NetworkTimeout,
            format!("descriptor fetch timed out after {}s", secs),
        ),
        other => DownloadError::provider(ProviderFailure::Unknown, other.to_string()),
    }
}

#[async_trait]
impl MediaProvider for YtDlpProvider {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, url: &str) -> Result<MediaDescriptor, DownloadError> {
        let args = self.fetch_args(url);
        tracing::debug!(binary = %self.ytdlp_path, args = %args.join(" "), "fetching descriptor");

        let out = run_output_with_timeout(&self.ytdlp_path, &args, self.config.fetch_timeout_secs)
            .await
            .map_err(provider_error)?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let reason = diagnose_error(&stderr);
            let excerpt = error_excerpt(&stderr);
            tracing::warn!(url, ?reason, stderr = %excerpt, "yt-dlp could not describe media");
            return Err(DownloadError::provider(reason, excerpt));
        }

        // Descriptors for long videos run to megabytes of JSON.
        let source_url = url.to_string();
        let stdout = out.stdout;
        let descriptor =
            tokio::task::spawn_blocking(move || parse_descriptor(&stdout, &source_url))
                .await
                .map_err(|e| {
                    DownloadError::provider(
                        ProviderFailure::Unknown,
                        format!("descriptor parsing task failed: {}", e),
                    )
                })??;

        tracing::debug!(
            title = %descriptor.title,
            streams = descriptor.streams.len(),
            "descriptor parsed"
        );
        Ok(descriptor)
    }

    async fn retrieve(
        &self,
        candidate: &StreamCandidate,
        dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, DownloadError> {
        let output = dir.join(filename);
        let args = self.retrieve_args(
            candidate.handle.format_id(),
            &output,
            candidate.handle.source_url(),
        );
        tracing::debug!(binary = %self.ytdlp_path, args = %args.join(" "), "retrieving stream");

        let out = run_output_with_timeout(
            &self.ytdlp_path,
            &args,
            self.config.transfer_timeout_secs,
        )
        .await
        .map_err(|e| DownloadError::transfer(format!("yt-dlp transfer: {}", e)))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(DownloadError::transfer(format!(
                "yt-dlp exited with {} ({:?}): {}",
                out.status,
                diagnose_error(&stderr),
                error_excerpt(&stderr)
            )));
        }

        let meta = tokio::fs::metadata(&output).await.map_err(|e| {
            DownloadError::transfer(format!("expected {}: {}", output.display(), e))
        })?;
        if !meta.is_file() || meta.len() == 0 {
            return Err(DownloadError::transfer(format!(
                "{} is missing or empty after transfer",
                output.display()
            )));
        }

        tracing::debug!(path = %output.display(), bytes = meta.len(), "stream retrieved");
        Ok(output)
    }
}
