//! Recovers the numeric TikTok video identifier from a URL.
//!
//! Patterns are tried in table order and the first match wins. Specific path
//! shapes come before looser ones so that a bare numeric segment is only used
//! when nothing better matched.

use super::error::MediaError;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Host fragment that enables the numeric path segment fallback.
const PLATFORM_DOMAIN: &str = "tiktok.com";

/// Numeric segments this short or shorter are never taken as identifiers.
const FALLBACK_MIN_DIGITS: usize = 6;

struct IdentifierPattern {
    name: &'static str,
    regex: Regex,
}

static PATTERNS: LazyLock<Vec<IdentifierPattern>> = LazyLock::new(|| {
    [
        ("video path", r"/video/([0-9]+)"),
        ("user video path", r"[/@][^/]+/video/([0-9]+)"),
        ("item_id query", r"[?&]item_id=([0-9]+)"),
        ("short /v/ path", r"/v/([0-9]+)"),
        ("short /t/ path", r"/t/([0-9]+)"),
    ]
    .into_iter()
    .map(|(name, pattern)| IdentifierPattern {
        name,
        regex: Regex::new(pattern).unwrap(),
    })
    .collect()
});

/// Rejects input that cannot be a URL before any stage runs.
pub fn validate_url(url: &str) -> Result<&str, MediaError> {
    let url = url.trim();
    if url.is_empty() || !url.starts_with("http") {
        return Err(MediaError::input("invalid url"));
    }
    Ok(url)
}

pub fn extract_video_id(url: &str) -> Result<String, MediaError> {
    if url.trim().is_empty() {
        return Err(MediaError::input("invalid url"));
    }

    debug!("Extracting video id from: {}", url);

    for pattern in PATTERNS.iter() {
        if let Some(id) = pattern.regex.captures(url).and_then(|caps| caps.get(1)) {
            debug!("Video id {} matched by {} pattern", id.as_str(), pattern.name);
            return Ok(id.as_str().to_string());
        }
    }

    // A long numeric username is indistinguishable from an id here.
    if let Some(id) = numeric_path_segment(url) {
        debug!("Video id {} taken from numeric path segment", id);
        return Ok(id);
    }

    Err(MediaError::extraction("no identifier found"))
}

fn numeric_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !parsed.host_str()?.contains(PLATFORM_DOMAIN) {
        return None;
    }

    parsed
        .path()
        .split('/')
        .find(|segment| {
            segment.len() >= FALLBACK_MIN_DIGITS && segment.bytes().all(|b| b.is_ascii_digit())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::error::ErrorKind;

    #[test]
    fn test_user_video_url() {
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@user/video/7123456789012345678").unwrap(),
            "7123456789012345678"
        );
    }

    #[test]
    fn test_video_path_anywhere() {
        for id in ["1", "42", "998877", "7300000000000000001"] {
            let urls = [
                format!("https://www.tiktok.com/video/{id}"),
                format!("https://m.tiktok.com/v2/share/video/{id}?lang=en"),
                format!("https://example.com/embed/video/{id}/"),
            ];
            for url in urls {
                assert_eq!(extract_video_id(&url).unwrap(), id, "url: {url}");
            }
        }
    }

    #[test]
    fn test_video_path_wins_over_query() {
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@a/video/111?item_id=222").unwrap(),
            "111"
        );
    }

    #[test]
    fn test_item_id_query() {
        assert_eq!(
            extract_video_id("https://www.tiktok.com/share?foo=bar&item_id=7011223344").unwrap(),
            "7011223344"
        );
        assert_eq!(
            extract_video_id("https://www.tiktok.com/share?item_id=55").unwrap(),
            "55"
        );
    }

    #[test]
    fn test_short_path_forms() {
        assert_eq!(
            extract_video_id("https://m.tiktok.com/v/6812345678.html").unwrap(),
            "6812345678"
        );
        assert_eq!(
            extract_video_id("https://www.tiktok.com/t/123456").unwrap(),
            "123456"
        );
    }

    #[test]
    fn test_numeric_segment_fallback() {
        assert_eq!(
            extract_video_id("https://www.tiktok.com/embed/7123456789").unwrap(),
            "7123456789"
        );
        // Long numeric usernames are taken as ids too.
        assert_eq!(
            extract_video_id("https://www.tiktok.com/1234567").unwrap(),
            "1234567"
        );
    }

    #[test]
    fn test_fallback_requires_platform_host_and_length() {
        let err = extract_video_id("https://example.com/embed/7123456789").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
        assert_eq!(err.message, "no identifier found");

        let err = extract_video_id("https://www.tiktok.com/embed/12345").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
    }

    #[test]
    fn test_no_identifier() {
        let err = extract_video_id("https://vm.tiktok.com/ZMabcDEF/").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
    }

    #[test]
    fn test_non_ascii_digits_are_not_ids() {
        let err = extract_video_id("https://example.com/video/١٢٣").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
    }

    #[test]
    fn test_empty_input() {
        for input in ["", "   "] {
            let err = extract_video_id(input).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Input);
            assert_eq!(err.message, "invalid url");
        }
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url(" https://www.tiktok.com/@a/video/1 ").unwrap(),
            "https://www.tiktok.com/@a/video/1"
        );
        assert_eq!(validate_url("ftp://x").unwrap_err().kind, ErrorKind::Input);
        assert_eq!(validate_url("").unwrap_err().kind, ErrorKind::Input);
    }
}
