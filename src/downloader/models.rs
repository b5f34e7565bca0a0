// Common data models for the download pipeline

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::errors::DownloadError;
use super::workspace::Workspace;

/// Video quality tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ResolutionTier {
    #[serde(rename = "144p")]
    P144,
    #[serde(rename = "240p")]
    P240,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "1440p")]
    P1440,
    #[serde(rename = "2160p")]
    P2160,
}

impl ResolutionTier {
    pub const ALL: [ResolutionTier; 8] = [
        Self::P144,
        Self::P240,
        Self::P360,
        Self::P480,
        Self::P720,
        Self::P1080,
        Self::P1440,
        Self::P2160,
    ];

    pub fn height(self) -> u32 {
        match self {
            Self::P144 => 144,
            Self::P240 => 240,
            Self::P360 => 360,
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
            Self::P1440 => 1440,
            Self::P2160 => 2160,
        }
    }

    /// Highest tier not above `height`. Anything under 144 lines counts as 144p.
    pub fn from_height(height: u32) -> Self {
        Self::ALL
            .iter()
            .rev()
            .find(|t| t.height() <= height)
            .copied()
            .unwrap_or(Self::P144)
    }

    /// Exact parse of "480p" / "480". Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let digits = value
            .strip_suffix('p')
            .or_else(|| value.strip_suffix('P'))
            .unwrap_or(value);
        let height: u32 = digits.parse().ok()?;
        Self::ALL.iter().find(|t| t.height() == height).copied()
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

/// What a candidate carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Audio and video in one file
    Progressive(ResolutionTier),
    /// Video track only (needs merging, never served)
    VideoOnly(ResolutionTier),
    AudioOnly,
}

/// Opaque reference the provider uses to transfer a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    format_id: String,
    source_url: String,
}

impl StreamHandle {
    pub fn new(format_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            format_id: format_id.into(),
            source_url: source_url.into(),
        }
    }

    pub fn format_id(&self) -> &str {
        &self.format_id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// One stream variant offered by the provider
#[derive(Debug, Clone)]
pub struct StreamCandidate {
    pub kind: StreamKind,
    /// Frames per second (video only)
    pub fps: Option<f32>,
    /// Average audio bitrate in kbps (audio only)
    pub abr: Option<f32>,
    /// Container family (mp4, webm, ...)
    pub container: String,
    /// e.g. "video/mp4", "audio/webm"
    pub mime_type: String,
    /// Exact size in bytes
    pub filesize: Option<u64>,
    /// Approximate size (when exact is unknown)
    pub filesize_approx: Option<u64>,
    pub handle: StreamHandle,
}

impl StreamCandidate {
    /// Get effective file size (exact or approximate)
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    pub fn tier(&self) -> Option<ResolutionTier> {
        match self.kind {
            StreamKind::Progressive(tier) | StreamKind::VideoOnly(tier) => Some(tier),
            StreamKind::AudioOnly => None,
        }
    }

    pub fn is_progressive(&self) -> bool {
        matches!(self.kind, StreamKind::Progressive(_))
    }

    pub fn is_audio_only(&self) -> bool {
        matches!(self.kind, StreamKind::AudioOnly)
    }
}

/// Everything the provider knows about one media item
#[derive(Debug, Clone)]
pub struct MediaDescriptor {
    pub title: String,
    pub streams: Vec<StreamCandidate>,
}

/// Container every video-mode download is served as.
pub const VIDEO_CONTAINER: &str = "mp4";

impl MediaDescriptor {
    /// Combined audio+video candidates in the served container, in catalog order.
    pub fn progressive_streams(&self) -> Vec<&StreamCandidate> {
        self.streams
            .iter()
            .filter(|s| s.is_progressive() && s.container == VIDEO_CONTAINER)
            .collect()
    }

    /// Audio-only candidates, in catalog order.
    pub fn audio_streams(&self) -> Vec<&StreamCandidate> {
        self.streams.iter().filter(|s| s.is_audio_only()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Video,
    Audio,
}

impl Mode {
    /// Absent or blank means video.
    pub fn parse(value: Option<&str>) -> Result<Self, DownloadError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(Self::Video),
            Some(v) if v.eq_ignore_ascii_case("video") => Ok(Self::Video),
            Some(v) if v.eq_ignore_ascii_case("audio") => Ok(Self::Audio),
            Some(_) => Err(DownloadError::Input(
                "Unsupported download type. Choose video or audio.".to_string(),
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionIntent {
    Best,
    Tier(ResolutionTier),
}

impl fmt::Display for ResolutionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => write!(f, "best"),
            Self::Tier(tier) => write!(f, "{}", tier),
        }
    }
}

/// Supported video tiers, highest first. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionLadder {
    tiers: Vec<ResolutionTier>,
}

impl ResolutionLadder {
    /// Tiers are sorted high to low and deduplicated; an empty ladder is rejected.
    pub fn new(mut tiers: Vec<ResolutionTier>) -> Result<Self, String> {
        tiers.sort_unstable_by(|a, b| b.cmp(a));
        tiers.dedup();
        if tiers.is_empty() {
            return Err("resolution ladder needs at least one tier".to_string());
        }
        Ok(Self { tiers })
    }

    /// Parse a comma separated list such as "720p,480p,360p".
    pub fn parse_list(list: &str) -> Result<Self, String> {
        let tiers = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| ResolutionTier::parse(s).ok_or_else(|| format!("unknown resolution tier: {}", s)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tiers)
    }

    pub fn tiers(&self) -> &[ResolutionTier] {
        &self.tiers
    }

    /// `tier` and every lower ladder tier, in walk order. Empty if `tier` is not on the ladder.
    pub fn walk_down_from(&self, tier: ResolutionTier) -> &[ResolutionTier] {
        match self.tiers.iter().position(|t| *t == tier) {
            Some(idx) => &self.tiers[idx..],
            None => &[],
        }
    }

    /// Values not on the ladder normalize to `Best`.
    pub fn parse_intent(&self, value: Option<&str>) -> ResolutionIntent {
        value
            .and_then(ResolutionTier::parse)
            .filter(|tier| self.tiers.contains(tier))
            .map_or(ResolutionIntent::Best, ResolutionIntent::Tier)
    }
}

impl Default for ResolutionLadder {
    fn default() -> Self {
        Self {
            tiers: vec![
                ResolutionTier::P720,
                ResolutionTier::P480,
                ResolutionTier::P360,
                ResolutionTier::P240,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest {
    pub mode: Mode,
    pub intent: ResolutionIntent,
}

/// Validated caller input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub selection: SelectionRequest,
}

impl DownloadRequest {
    pub fn parse(
        url: Option<&str>,
        mode: Option<&str>,
        resolution: Option<&str>,
        ladder: &ResolutionLadder,
    ) -> Result<Self, DownloadError> {
        let url = validate_url(url)?;
        let mode = Mode::parse(mode)?;
        Ok(Self {
            url,
            selection: SelectionRequest {
                mode,
                intent: ladder.parse_intent(resolution),
            },
        })
    }
}

/// Accepts only absolute http(s) URLs.
pub fn validate_url(url: Option<&str>) -> Result<String, DownloadError> {
    let url = url.map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return Err(DownloadError::Input("Please enter a video URL.".to_string()));
    }

    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(DownloadError::Input(
            "The URL must start with http:// or https://.".to_string(),
        ));
    }

    match url::Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some() => Ok(url.to_string()),
        _ => Err(DownloadError::Input("The URL is not valid.".to_string())),
    }
}

/// Tunables shared read-only by every request
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub ladder: ResolutionLadder,
    /// Size guard threshold in bytes
    pub max_bytes: u64,
    /// Filename stem used when a title sanitizes to nothing
    pub fallback_name: String,
    /// Parent for per-request workspaces (system temp dir when unset)
    pub workspace_root: Option<PathBuf>,
}

pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            ladder: ResolutionLadder::default(),
            max_bytes: DEFAULT_MAX_BYTES,
            fallback_name: "download".to_string(),
            workspace_root: None,
        }
    }
}

/// A downloaded file waiting for (or in) transfer.
///
/// Owns the workspace, so the directory lives exactly as long as the job.
#[derive(Debug)]
pub struct DownloadJob {
    pub workspace: Workspace,
    /// Name suggested to the caller
    pub filename: String,
    /// Absolute path inside the workspace
    pub file_path: PathBuf,
    pub content_type: String,
}

impl DownloadJob {
    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse_accepts_both_spellings() {
        assert_eq!(ResolutionTier::parse("480p"), Some(ResolutionTier::P480));
        assert_eq!(ResolutionTier::parse(" 720 "), Some(ResolutionTier::P720));
        assert_eq!(ResolutionTier::parse("1080P"), Some(ResolutionTier::P1080));
        assert_eq!(ResolutionTier::parse("500p"), None);
        assert_eq!(ResolutionTier::parse("best"), None);
    }

    #[test]
    fn test_tier_from_height_floors() {
        assert_eq!(ResolutionTier::from_height(1080), ResolutionTier::P1080);
        assert_eq!(ResolutionTier::from_height(404), ResolutionTier::P360);
        assert_eq!(ResolutionTier::from_height(90), ResolutionTier::P144);
        assert_eq!(ResolutionTier::from_height(4320), ResolutionTier::P2160);
    }

    #[test]
    fn test_ladder_sorts_and_walks_down() {
        let ladder = ResolutionLadder::parse_list("240p, 720p,480p,360p,480").unwrap();
        assert_eq!(ladder, ResolutionLadder::default());
        assert_eq!(
            ladder.walk_down_from(ResolutionTier::P480),
            &[ResolutionTier::P480, ResolutionTier::P360, ResolutionTier::P240]
        );
        assert!(ladder.walk_down_from(ResolutionTier::P1080).is_empty());
    }

    #[test]
    fn test_ladder_rejects_empty_and_unknown() {
        assert!(ResolutionLadder::parse_list("").is_err());
        assert!(ResolutionLadder::parse_list("720p,999p").is_err());
    }

    #[test]
    fn test_unknown_intent_normalizes_to_best() {
        let ladder = ResolutionLadder::default();
        assert_eq!(ladder.parse_intent(Some("480p")), ResolutionIntent::Tier(ResolutionTier::P480));
        assert_eq!(ladder.parse_intent(Some("1080p")), ResolutionIntent::Best);
        assert_eq!(ladder.parse_intent(Some("best")), ResolutionIntent::Best);
        assert_eq!(ladder.parse_intent(Some("garbage")), ResolutionIntent::Best);
        assert_eq!(ladder.parse_intent(None), ResolutionIntent::Best);
    }

    #[test]
    fn test_request_rejects_missing_or_non_http_url() {
        let ladder = ResolutionLadder::default();
        for bad in [None, Some(""), Some("   "), Some("ftp://host/x"), Some("youtube.com/watch?v=1"), Some("https://")] {
            let err = DownloadRequest::parse(bad, None, None, &ladder).unwrap_err();
            assert!(matches!(err, DownloadError::Input(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_request_mode_parsing() {
        let ladder = ResolutionLadder::default();
        let req = DownloadRequest::parse(Some("https://valid.example/v"), Some("AUDIO"), Some("360p"), &ladder)
            .unwrap();
        assert_eq!(req.selection.mode, Mode::Audio);
        assert_eq!(req.selection.intent, ResolutionIntent::Tier(ResolutionTier::P360));

        let req = DownloadRequest::parse(Some("https://valid.example/v"), None, None, &ladder).unwrap();
        assert_eq!(req.selection.mode, Mode::Video);

        let err = DownloadRequest::parse(Some("https://valid.example/v"), Some("gif"), None, &ladder)
            .unwrap_err();
        assert!(matches!(err, DownloadError::Input(_)));
    }
}
