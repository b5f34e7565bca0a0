// FormatSelector - picks the stream to download
//
// Video mode only ever considers progressive candidates (audio+video in one file):
// - "best": highest tier, then highest frame rate
// - a ladder tier: walk the ladder downward from that tier, first tier with a
//   candidate wins (highest frame rate among equals); nothing found → "best"
// Audio mode takes the highest average bitrate.
//
// Remaining ties keep the earliest candidate in catalog order.

use std::cmp::Ordering;

use super::errors::DownloadError;
use super::models::{
    MediaDescriptor, Mode, ResolutionIntent, ResolutionLadder, SelectionRequest, StreamCandidate,
};

pub struct FormatSelector;

impl FormatSelector {
    /// Route to the video or audio selector depending on mode.
    pub fn select<'a>(
        descriptor: &'a MediaDescriptor,
        request: &SelectionRequest,
        ladder: &ResolutionLadder,
    ) -> Result<&'a StreamCandidate, DownloadError> {
        let chosen = match request.mode {
            Mode::Video => {
                Self::resolve_video(&descriptor.progressive_streams(), request.intent, ladder)
            }
            Mode::Audio => Self::find_best_audio(&descriptor.audio_streams()),
        };

        chosen.ok_or(DownloadError::Selection { mode: request.mode })
    }

    /// Resolution ladder walk. `None` only when `candidates` is empty.
    pub fn resolve_video<'a>(
        candidates: &[&'a StreamCandidate],
        intent: ResolutionIntent,
        ladder: &ResolutionLadder,
    ) -> Option<&'a StreamCandidate> {
        if let ResolutionIntent::Tier(requested) = intent {
            for tier in ladder.walk_down_from(requested) {
                let at_tier = candidates.iter().copied().filter(|c| c.tier() == Some(*tier));
                if let Some(found) = first_max_by(at_tier, compare_fps) {
                    return Some(found);
                }
            }
        }

        Self::find_best_video(candidates)
    }

    /// Highest tier, tie-break by frame rate.
    pub fn find_best_video<'a>(candidates: &[&'a StreamCandidate]) -> Option<&'a StreamCandidate> {
        first_max_by(candidates.iter().copied(), |a, b| {
            a.tier().cmp(&b.tier()).then_with(|| compare_fps(a, b))
        })
    }

    /// Highest average bitrate.
    pub fn find_best_audio<'a>(candidates: &[&'a StreamCandidate]) -> Option<&'a StreamCandidate> {
        first_max_by(candidates.iter().copied(), |a, b| {
            a.abr.unwrap_or(0.0).total_cmp(&b.abr.unwrap_or(0.0))
        })
    }
}

fn compare_fps(a: &StreamCandidate, b: &StreamCandidate) -> Ordering {
    a.fps.unwrap_or(0.0).total_cmp(&b.fps.unwrap_or(0.0))
}

/// Like `Iterator::max_by`, but the first of several equal maxima wins.
fn first_max_by<'a, I, F>(iter: I, mut compare: F) -> Option<&'a StreamCandidate>
where
    I: Iterator<Item = &'a StreamCandidate>,
    F: FnMut(&StreamCandidate, &StreamCandidate) -> Ordering,
{
    iter.reduce(|best, c| {
        if compare(c, best) == Ordering::Greater {
            c
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::{ResolutionTier, StreamHandle, StreamKind};

    fn make_progressive(id: &str, tier: ResolutionTier, fps: f32) -> StreamCandidate {
        StreamCandidate {
            kind: StreamKind::Progressive(tier),
            fps: Some(fps),
            abr: None,
            container: "mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            filesize: None,
            filesize_approx: None,
            handle: StreamHandle::new(id, "https://valid.example/v"),
        }
    }

    fn make_video_only(id: &str, tier: ResolutionTier) -> StreamCandidate {
        StreamCandidate {
            kind: StreamKind::VideoOnly(tier),
            ..make_progressive(id, tier, 60.0)
        }
    }

    fn make_audio(id: &str, abr: f32, container: &str) -> StreamCandidate {
        StreamCandidate {
            kind: StreamKind::AudioOnly,
            fps: None,
            abr: Some(abr),
            container: container.to_string(),
            mime_type: format!("audio/{}", container),
            filesize: None,
            filesize_approx: None,
            handle: StreamHandle::new(id, "https://valid.example/v"),
        }
    }

    fn descriptor(streams: Vec<StreamCandidate>) -> MediaDescriptor {
        MediaDescriptor {
            title: "clip".to_string(),
            streams,
        }
    }

    fn video(intent: ResolutionIntent) -> SelectionRequest {
        SelectionRequest {
            mode: Mode::Video,
            intent,
        }
    }

    fn picked<'a>(desc: &'a MediaDescriptor, request: SelectionRequest) -> &'a str {
        FormatSelector::select(desc, &request, &ResolutionLadder::default())
            .unwrap()
            .handle
            .format_id()
    }

    #[test]
    fn test_walk_is_downward_only() {
        let desc = descriptor(vec![
            make_progressive("22", ResolutionTier::P720, 30.0),
            make_progressive("5", ResolutionTier::P240, 30.0),
        ]);
        assert_eq!(picked(&desc, video(ResolutionIntent::Tier(ResolutionTier::P480))), "5");
    }

    #[test]
    fn test_exact_tier_preferred() {
        let desc = descriptor(vec![
            make_progressive("22", ResolutionTier::P720, 30.0),
            make_progressive("35", ResolutionTier::P480, 30.0),
            make_progressive("18", ResolutionTier::P360, 30.0),
        ]);
        assert_eq!(picked(&desc, video(ResolutionIntent::Tier(ResolutionTier::P480))), "35");
    }

    #[test]
    fn test_nothing_at_or_below_falls_back_to_best() {
        let desc = descriptor(vec![
            make_progressive("22", ResolutionTier::P720, 30.0),
            make_progressive("37", ResolutionTier::P1080, 30.0),
        ]);
        assert_eq!(picked(&desc, video(ResolutionIntent::Tier(ResolutionTier::P360))), "37");
    }

    #[test]
    fn test_best_tie_breaks_on_frame_rate_then_catalog_order() {
        let desc = descriptor(vec![
            make_progressive("a", ResolutionTier::P720, 30.0),
            make_progressive("b", ResolutionTier::P720, 60.0),
            make_progressive("c", ResolutionTier::P720, 60.0),
            make_progressive("d", ResolutionTier::P360, 60.0),
        ]);
        assert_eq!(picked(&desc, video(ResolutionIntent::Best)), "b");
    }

    #[test]
    fn test_tier_match_tie_breaks_on_frame_rate() {
        let desc = descriptor(vec![
            make_progressive("a", ResolutionTier::P360, 25.0),
            make_progressive("b", ResolutionTier::P360, 50.0),
            make_progressive("c", ResolutionTier::P720, 60.0),
        ]);
        assert_eq!(picked(&desc, video(ResolutionIntent::Tier(ResolutionTier::P480))), "b");
    }

    #[test]
    fn test_video_only_and_non_mp4_never_chosen() {
        let mut webm = make_progressive("43", ResolutionTier::P720, 30.0);
        webm.container = "webm".to_string();
        let desc = descriptor(vec![
            make_video_only("137", ResolutionTier::P1080),
            webm,
            make_progressive("18", ResolutionTier::P360, 30.0),
        ]);
        assert_eq!(picked(&desc, video(ResolutionIntent::Best)), "18");
        assert_eq!(picked(&desc, video(ResolutionIntent::Tier(ResolutionTier::P720))), "18");
    }

    #[test]
    fn test_video_selection_error_without_progressive() {
        let desc = descriptor(vec![
            make_video_only("137", ResolutionTier::P1080),
            make_audio("140", 128.0, "mp4"),
        ]);
        let err = FormatSelector::select(
            &desc,
            &video(ResolutionIntent::Best),
            &ResolutionLadder::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DownloadError::Selection { mode: Mode::Video }));
    }

    #[test]
    fn test_resolver_never_empty_for_non_empty_input() {
        let ladder = ResolutionLadder::default();
        let pool: Vec<StreamCandidate> = ResolutionTier::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| make_progressive(&i.to_string(), *t, 30.0))
            .collect();

        // every contiguous window of the pool, against every intent
        for start in 0..pool.len() {
            for end in start + 1..=pool.len() {
                let refs: Vec<&StreamCandidate> = pool[start..end].iter().collect();
                let mut intents = vec![ResolutionIntent::Best];
                intents.extend(ResolutionTier::ALL.iter().map(|t| ResolutionIntent::Tier(*t)));
                for intent in intents {
                    let chosen = FormatSelector::resolve_video(&refs, intent, &ladder);
                    assert!(chosen.is_some(), "empty for {:?} over {}..{}", intent, start, end);
                }
            }
        }

        assert!(FormatSelector::resolve_video(&[], ResolutionIntent::Best, &ladder).is_none());
    }

    #[test]
    fn test_audio_picks_highest_bitrate() {
        let desc = descriptor(vec![
            make_progressive("18", ResolutionTier::P360, 30.0),
            make_audio("139", 48.0, "mp4"),
            make_audio("251", 160.0, "webm"),
            make_audio("140", 129.5, "mp4"),
        ]);
        let request = SelectionRequest {
            mode: Mode::Audio,
            intent: ResolutionIntent::Best,
        };
        let chosen = FormatSelector::select(&desc, &request, &ResolutionLadder::default()).unwrap();
        assert_eq!(chosen.handle.format_id(), "251");
        for other in desc.audio_streams() {
            assert!(chosen.abr >= other.abr);
        }
    }

    #[test]
    fn test_audio_selection_error_when_no_audio_only() {
        let desc = descriptor(vec![make_progressive("18", ResolutionTier::P360, 30.0)]);
        let request = SelectionRequest {
            mode: Mode::Audio,
            intent: ResolutionIntent::Tier(ResolutionTier::P360),
        };
        let err = FormatSelector::select(&desc, &request, &ResolutionLadder::default()).unwrap_err();
        assert!(matches!(err, DownloadError::Selection { mode: Mode::Audio }));
    }
}
