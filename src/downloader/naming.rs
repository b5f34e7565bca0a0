// Safe output filenames
//
// <sanitized title>_<YYYYMMDD_HHMMSS>.<ext>
// Two requests for the same title in the same second produce the same name;
// each request has its own workspace, so that is harmless.

use regex::Regex;
use time::macros::format_description;
use time::OffsetDateTime;

use super::models::{Mode, StreamCandidate, VIDEO_CONTAINER};

/// Filesystems cap names at 255 bytes; leave room for the stamp and extension.
const MAX_STEM_CHARS: usize = 150;

const LAST_RESORT_NAME: &str = "download";

const FALLBACK_AUDIO_EXT: &str = "mp3";

lazy_static::lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^\w\-.\s()\[\]]").unwrap();
}

fn clean(raw: &str) -> String {
    let stripped = UNSAFE_CHARS.replace_all(raw, "");
    let trimmed = stripped.trim();
    match trimmed.char_indices().nth(MAX_STEM_CHARS) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Keep word characters, hyphen, period, whitespace, parentheses and brackets.
/// Falls back to `fallback` (itself cleaned) when nothing survives.
pub fn sanitize_title(raw: &str, fallback: &str) -> String {
    let name = clean(raw);
    if !name.is_empty() {
        return name;
    }

    let fallback = clean(fallback);
    if fallback.is_empty() {
        LAST_RESORT_NAME.to_string()
    } else {
        fallback
    }
}

/// Second-resolution, sortable UTC stamp.
pub fn timestamp(at: OffsetDateTime) -> String {
    let stamp_format = format_description!("[year][month][day]_[hour][minute][second]");
    at.format(&stamp_format)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Video is always served as mp4; audio keeps its container family.
pub fn extension_for(mode: Mode, candidate: &StreamCandidate) -> &'static str {
    match mode {
        Mode::Video => VIDEO_CONTAINER,
        Mode::Audio => audio_extension(&candidate.container, &candidate.mime_type),
    }
}

fn audio_extension(container: &str, mime_type: &str) -> &'static str {
    let family = if container.is_empty() {
        mime_type.rsplit('/').next().unwrap_or_default()
    } else {
        container
    };

    match family.to_ascii_lowercase().as_str() {
        "mp4" | "m4a" => "m4a",
        "webm" => "webm",
        "ogg" | "opus" => "ogg",
        "mpeg" | "mp3" => "mp3",
        _ => FALLBACK_AUDIO_EXT,
    }
}

pub fn build_filename(title: &str, fallback: &str, extension: &str, at: OffsetDateTime) -> String {
    format!(
        "{}_{}.{}",
        sanitize_title(title, fallback),
        timestamp(at),
        extension
    )
}
