// Engine failure diagnostics
//
// Maps engine error text to a short machine-readable reason that the API
// attaches to 500 responses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// DRM-protected or paid content
    DrmProtected,
    /// Age-restricted content requiring login
    AgeRestricted,
    /// Private video requiring authorization
    PrivateVideo,
    /// Video deleted or unavailable
    VideoUnavailable,
    /// Geographic restriction
    GeoBlocked,
    /// HTTP 429 or similar
    RateLimited,
    /// Bot detection / captcha
    BotDetection,
    /// HTTP 403 Forbidden
    Forbidden,
    /// No extractor for this site
    UnsupportedUrl,
    /// Network timeout or unreachable host
    NetworkTimeout,
    /// Engine not installed
    ToolMissing,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DrmProtected => "drm_protected",
            Self::AgeRestricted => "age_restricted",
            Self::PrivateVideo => "private_video",
            Self::VideoUnavailable => "video_unavailable",
            Self::GeoBlocked => "geo_blocked",
            Self::RateLimited => "rate_limited",
            Self::BotDetection => "bot_detection",
            Self::Forbidden => "forbidden",
            Self::UnsupportedUrl => "unsupported_url",
            Self::NetworkTimeout => "network_timeout",
            Self::ToolMissing => "tool_missing",
        }
    }

    /// Whether cookies configured on the server might help
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::AgeRestricted | Self::PrivateVideo | Self::BotDetection | Self::Forbidden
        )
    }
}

/// Analyze an error message and return the failure reason, if recognized
pub fn diagnose_error(error: &str) -> Option<FailureReason> {
    let lower = error.to_lowercase();

    // Order matters: most specific first
    if lower.contains("drm")
        || lower.contains("widevine")
        || lower.contains("playready")
        || lower.contains("fairplay")
        || lower.contains("requires purchase")
        || lower.contains("requires payment")
    {
        return Some(FailureReason::DrmProtected);
    }

    if lower.contains("age-restricted")
        || lower.contains("confirm your age")
        || lower.contains("age_verification")
    {
        return Some(FailureReason::AgeRestricted);
    }

    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("granted access")
    {
        return Some(FailureReason::PrivateVideo);
    }

    if lower.contains("video unavailable")
        || lower.contains("has been removed")
        || lower.contains("no longer available")
        || lower.contains("video is unavailable")
    {
        return Some(FailureReason::VideoUnavailable);
    }

    if lower.contains("not available in your country") || lower.contains("geo restrict") {
        return Some(FailureReason::GeoBlocked);
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests")
    {
        return Some(FailureReason::RateLimited);
    }

    if lower.contains("not a bot") || lower.contains("captcha") || lower.contains("unusual traffic")
    {
        return Some(FailureReason::BotDetection);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(FailureReason::Forbidden);
    }

    if lower.contains("unsupported url") {
        return Some(FailureReason::UnsupportedUrl);
    }

    if lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("connection refused")
        || lower.contains("network is unreachable")
        || lower.contains("name or service not known")
    {
        return Some(FailureReason::NetworkTimeout);
    }

    if lower.contains("no module named yt_dlp") || lower.contains("tool not found") {
        return Some(FailureReason::ToolMissing);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_403_detection() {
        let error = "ERROR: unable to download video data: HTTP Error 403: Forbidden";
        assert_eq!(diagnose_error(error), Some(FailureReason::Forbidden));
    }

    #[test]
    fn test_age_restricted_detection() {
        let error = "Sign in to confirm your age. This video may be inappropriate";
        assert_eq!(diagnose_error(error), Some(FailureReason::AgeRestricted));
    }

    #[test]
    fn test_bot_detection() {
        let error = "Sign in to confirm you're not a bot";
        assert_eq!(diagnose_error(error), Some(FailureReason::BotDetection));
        assert!(FailureReason::BotDetection.cookies_might_help());
    }

    #[test]
    fn test_geo_detection() {
        let error = "ERROR: [vimeo] 123: Video not available in your country";
        assert_eq!(diagnose_error(error), Some(FailureReason::GeoBlocked));
    }

    #[test]
    fn test_unsupported_url_detection() {
        let error = "ERROR: Unsupported URL: https://example.com/";
        assert_eq!(diagnose_error(error), Some(FailureReason::UnsupportedUrl));
    }

    #[test]
    fn test_timeout_detection() {
        assert_eq!(
            diagnose_error("timed out after 60s"),
            Some(FailureReason::NetworkTimeout)
        );
    }

    #[test]
    fn test_drm_detection() {
        let error = "This video is DRM protected";
        assert_eq!(diagnose_error(error), Some(FailureReason::DrmProtected));
        assert!(!FailureReason::DrmProtected.cookies_might_help());
    }

    #[test]
    fn test_unknown_is_none() {
        assert_eq!(diagnose_error("something odd happened"), None);
        assert_eq!(diagnose_error(""), None);
    }

    #[test]
    fn test_reason_labels_match_serde() {
        let json = serde_json::to_value(FailureReason::VideoUnavailable).unwrap();
        assert_eq!(json, FailureReason::VideoUnavailable.as_str());
    }
}
