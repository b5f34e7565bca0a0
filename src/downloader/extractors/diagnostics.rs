// Provider failure diagnostics
//
// Classifies yt-dlp stderr so the caller gets a specific, safe hint while the
// raw text stays in the log.

/// Why the provider could not describe the media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    /// yt-dlp binary missing or not executable
    ToolMissing,

    /// DRM-protected / paid / Premium content
    DrmProtected,

    /// Requires channel membership
    MembersOnly,

    /// Proof of Origin token required
    PoTokenRequired,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Private video requiring authorization
    PrivateVideo,

    /// Deleted or otherwise unavailable
    Unavailable,

    /// Geographic restriction
    GeoBlocked,

    /// URL not handled by any extractor
    UnsupportedUrl,

    /// Live broadcasts have no finite file
    LiveStream,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Bot detection triggered
    BotDetection,

    /// HTTP 403 without a more specific cause
    Forbidden,

    /// Timeout or connection failure (possible soft IP block)
    NetworkTimeout,

    /// Provider output could not be understood
    Malformed,

    Unknown,
}

impl ProviderFailure {
    /// Text safe to return to the caller.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ToolMissing => "The download service is not available right now.",
            Self::DrmProtected => "This video is DRM-protected and cannot be downloaded.",
            Self::MembersOnly => "This video is only available to channel members.",
            Self::PoTokenRequired | Self::BotDetection => {
                "The video platform refused the request. Please try again later."
            }
            Self::AgeRestricted => "This video is age-restricted and cannot be downloaded.",
            Self::PrivateVideo => "This video is private.",
            Self::Unavailable => "This video is unavailable. It may have been removed.",
            Self::GeoBlocked => "This video is not available in the server's region.",
            Self::UnsupportedUrl => "This URL is not supported.",
            Self::LiveStream => "Live streams cannot be downloaded.",
            Self::RateLimited => "Too many requests to the video platform. Please wait and try again.",
            Self::Forbidden => "Access to this video was denied.",
            Self::NetworkTimeout => "The video platform did not respond in time. Please try again.",
            Self::Malformed | Self::Unknown => {
                "Error loading video. Check the URL and try again."
            }
        }
    }
}

/// Analyze provider stderr and return the most specific reason
pub fn diagnose_error(error: &str) -> ProviderFailure {
    let lower = error.to_lowercase();

    // DRM protection (permanent restriction)
    if lower.contains("drm")
        || lower.contains("widevine")
        || lower.contains("playready")
        || lower.contains("fairplay")
        || lower.contains("youtube premium")
        || lower.contains("requires purchase")
        || lower.contains("rental")
        || lower.contains("this video requires payment")
    {
        return ProviderFailure::DrmProtected;
    }

    // Members-only content
    if lower.contains("members only")
        || lower.contains("members-only")
        || lower.contains("join this channel")
        || lower.contains("available to members")
    {
        return ProviderFailure::MembersOnly;
    }

    if lower.contains("po token") || lower.contains("proof of origin") {
        return ProviderFailure::PoTokenRequired;
    }

    if lower.contains("age-restricted")
        || lower.contains("sign in to confirm your age")
        || lower.contains("age_verification")
    {
        return ProviderFailure::AgeRestricted;
    }

    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("sign in if you've been granted access")
    {
        return ProviderFailure::PrivateVideo;
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("this video is no longer available")
        || lower.contains("video is unavailable")
    {
        return ProviderFailure::Unavailable;
    }

    if lower.contains("available in your country")
        || lower.contains("blocked in your country")
        || lower.contains("geo restriction")
        || lower.contains("geo-restricted")
    {
        return ProviderFailure::GeoBlocked;
    }

    if lower.contains("unsupported url") || lower.contains("is not a valid url") {
        return ProviderFailure::UnsupportedUrl;
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests") {
        return ProviderFailure::RateLimited;
    }

    if lower.contains("not a bot")
        || lower.contains("captcha")
        || lower.contains("unusual traffic")
        || lower.contains("automated")
    {
        return ProviderFailure::BotDetection;
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return ProviderFailure::Forbidden;
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return ProviderFailure::NetworkTimeout;
    }

    ProviderFailure::Unknown
}

/// First `ERROR:` line (or first non-empty line) of stderr, for logs.
pub fn error_excerpt(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("no stderr output captured")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_403_detection() {
        let error = "ERROR: unable to download video data: HTTP Error 403: Forbidden";
        assert_eq!(diagnose_error(error), ProviderFailure::Forbidden);
    }

    #[test]
    fn test_po_token_detection() {
        let error = "mweb client https formats require a GVS PO Token";
        assert_eq!(diagnose_error(error), ProviderFailure::PoTokenRequired);
    }

    #[test]
    fn test_bot_detection() {
        let error = "ERROR: [youtube] dQw4w9WgXcQ: Sign in to confirm you're not a bot";
        assert_eq!(diagnose_error(error), ProviderFailure::BotDetection);
    }

    #[test]
    fn test_age_restricted_detection() {
        let error = "Sign in to confirm your age. This video may be inappropriate for some users.";
        assert_eq!(diagnose_error(error), ProviderFailure::AgeRestricted);
    }

    #[test]
    fn test_private_and_unavailable_detection() {
        assert_eq!(
            diagnose_error("ERROR: [youtube] abc: Private video. Sign in if you've been granted access"),
            ProviderFailure::PrivateVideo
        );
        assert_eq!(
            diagnose_error("ERROR: [youtube] abc: Video unavailable"),
            ProviderFailure::Unavailable
        );
    }

    #[test]
    fn test_unsupported_url_detection() {
        let error = "ERROR: Unsupported URL: https://example.com/page";
        assert_eq!(diagnose_error(error), ProviderFailure::UnsupportedUrl);
    }

    #[test]
    fn test_timeout_detection() {
        assert_eq!(diagnose_error("Timed out after 60s"), ProviderFailure::NetworkTimeout);
    }

    #[test]
    fn test_geo_detection() {
        let error = "The uploader has not made this video available in your country";
        assert_eq!(diagnose_error(error), ProviderFailure::GeoBlocked);
    }

    #[test]
    fn test_drm_detection() {
        assert_eq!(diagnose_error("This video is DRM protected"), ProviderFailure::DrmProtected);
        assert_eq!(
            diagnose_error("This video requires YouTube Premium"),
            ProviderFailure::DrmProtected
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(diagnose_error("something odd happened"), ProviderFailure::Unknown);
        assert_eq!(diagnose_error(""), ProviderFailure::Unknown);
    }

    #[test]
    fn test_user_messages_never_echo_input() {
        let stderr = "ERROR: [youtube] secret-id: Video unavailable at /srv/cache";
        let msg = diagnose_error(stderr).user_message();
        assert!(!msg.contains("secret-id"));
        assert!(!msg.contains("/srv"));
    }

    #[test]
    fn test_error_excerpt_prefers_error_line() {
        let stderr = "WARNING: noisy\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(error_excerpt(stderr), "ERROR: [youtube] abc: Video unavailable");
        assert_eq!(error_excerpt("  \nfirst\n"), "first");
        assert_eq!(error_excerpt(""), "no stderr output captured");
    }
}
