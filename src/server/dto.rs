// Response bodies

use serde::Serialize;

use crate::downloader::{
    FormatSelector, MediaDescriptor, Mode, ResolutionIntent, ResolutionLadder, ResolutionTier,
    SelectionRequest, StreamCandidate, StreamKind,
};

/// `GET /`
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub provider: &'static str,
    pub endpoints: Vec<&'static str>,
    pub ladder: Vec<ResolutionTier>,
    pub max_size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Progressive,
    VideoOnly,
    AudioOnly,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub kind: CandidateKind,
    pub tier: Option<ResolutionTier>,
    pub fps: Option<f32>,
    pub abr: Option<f32>,
    pub mime_type: String,
    pub size_bytes: Option<u64>,
}

impl From<&StreamCandidate> for CandidateSummary {
    fn from(candidate: &StreamCandidate) -> Self {
        let kind = match candidate.kind {
            StreamKind::Progressive(_) => CandidateKind::Progressive,
            StreamKind::VideoOnly(_) => CandidateKind::VideoOnly,
            StreamKind::AudioOnly => CandidateKind::AudioOnly,
        };
        Self {
            kind,
            tier: candidate.tier(),
            fps: candidate.fps,
            abr: candidate.abr,
            mime_type: candidate.mime_type.clone(),
            size_bytes: candidate.effective_size(),
        }
    }
}

/// `POST /info`: the catalog plus what a download would pick.
#[derive(Debug, Serialize)]
pub struct MediaSummary {
    pub title: String,
    pub candidates: Vec<CandidateSummary>,
    pub best_video: Option<CandidateSummary>,
    pub best_audio: Option<CandidateSummary>,
}

impl MediaSummary {
    pub fn new(descriptor: &MediaDescriptor, ladder: &ResolutionLadder) -> Self {
        let pick = |mode| {
            let request = SelectionRequest {
                mode,
                intent: ResolutionIntent::Best,
            };
            FormatSelector::select(descriptor, &request, ladder)
                .ok()
                .map(CandidateSummary::from)
        };

        Self {
            title: descriptor.title.clone(),
            candidates: descriptor.streams.iter().map(CandidateSummary::from).collect(),
            best_video: pick(Mode::Video),
            best_audio: pick(Mode::Audio),
        }
    }
}
