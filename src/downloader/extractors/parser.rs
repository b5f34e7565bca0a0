// yt-dlp `--dump-json` output -> MediaDescriptor

use regex::Regex;
use serde_json::Value;

use super::diagnostics::ProviderFailure;
use crate::downloader::errors::DownloadError;
use crate::downloader::models::{
    MediaDescriptor, ResolutionTier, StreamCandidate, StreamHandle, StreamKind,
};

lazy_static::lazy_static! {
    static ref NOTE_HEIGHT: Regex = Regex::new(r"(\d{3,4})p").unwrap();
}

/// Parse one `--dump-json` document. Storyboards, DRM formats and video
/// formats without a known height are left out.
pub fn parse_descriptor(stdout: &[u8], source_url: &str) -> Result<MediaDescriptor, DownloadError> {
    let json: Value = serde_json::from_slice(stdout).map_err(|e| {
        DownloadError::provider(ProviderFailure::Malformed, format!("Invalid JSON: {}", e))
    })?;

    if !json.is_object() {
        return Err(DownloadError::provider(
            ProviderFailure::Malformed,
            "top-level JSON is not an object",
        ));
    }

    if json["is_live"].as_bool() == Some(true) || json["live_status"].as_str() == Some("is_live")
    {
        return Err(DownloadError::provider(
            ProviderFailure::LiveStream,
            "media is a live broadcast",
        ));
    }

    // Single-file extractors put the only format at top level.
    let streams = match json["formats"].as_array() {
        Some(formats) => formats
            .iter()
            .filter_map(|f| parse_format(f, source_url))
            .collect(),
        None => parse_format(&json, source_url).into_iter().collect(),
    };

    Ok(MediaDescriptor {
        title: json["title"].as_str().unwrap_or_default().to_string(),
        streams,
    })
}

fn parse_format(f: &Value, source_url: &str) -> Option<StreamCandidate> {
    if f["has_drm"].as_bool() == Some(true) {
        return None;
    }

    let format_id = f["format_id"].as_str().filter(|id| !id.is_empty())?;
    let has_video = f["vcodec"].as_str().is_some_and(|v| v != "none");
    let has_audio = f["acodec"].as_str().is_some_and(|a| a != "none");
    let container = f["ext"].as_str().unwrap_or_default().to_ascii_lowercase();

    let kind = match (has_video, has_audio) {
        (true, true) => StreamKind::Progressive(video_tier(f)?),
        (true, false) => StreamKind::VideoOnly(video_tier(f)?),
        (false, true) => StreamKind::AudioOnly,
        (false, false) => return None,
    };

    let mime_type = if has_video {
        format!("video/{}", container)
    } else if container == "m4a" {
        "audio/mp4".to_string()
    } else {
        format!("audio/{}", container)
    };

    Some(StreamCandidate {
        kind,
        fps: if has_video { as_f32(&f["fps"]) } else { None },
        abr: if has_audio {
            as_f32(&f["abr"]).or_else(|| if has_video { None } else { as_f32(&f["tbr"]) })
        } else {
            None
        },
        container,
        mime_type,
        filesize: as_size(&f["filesize"]),
        filesize_approx: as_size(&f["filesize_approx"]),
        handle: StreamHandle::new(format_id, source_url),
    })
}

/// Label first ("720p60" -> 720), pixel height second.
fn video_tier(f: &Value) -> Option<ResolutionTier> {
    let from_note = f["format_note"]
        .as_str()
        .and_then(|note| NOTE_HEIGHT.captures(note))
        .and_then(|caps| caps[1].parse::<u32>().ok());

    let height = from_note.or_else(|| f["height"].as_u64().map(|h| h as u32))?;
    if height == 0 {
        return None;
    }
    Some(ResolutionTier::from_height(height))
}

fn as_f32(value: &Value) -> Option<f32> {
    value.as_f64().filter(|v| *v > 0.0).map(|v| v as f32)
}

fn as_size(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v.round() as u64))
}
