//! Ticket code extraction from raw scanned text.
//!
//! A QR payload is either the bare ticket code or a URL containing
//! `ticket/<code>`. Anything else is rejected without touching any ticket.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Bare ticket code, e.g. `EVT-ABC123-XY12`. Case-insensitive.
static BARE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)EVT-[A-Z0-9]+-[A-Z0-9]+$").expect("valid regex"));

/// Code embedded in a URL path, e.g. `https://…/ticket/EVT-ABC123-XY12?src=qr`.
static URL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ticket/(EVT-[A-Z0-9]+-[A-Z0-9]+)").expect("valid regex"));

/// Extract the canonical ticket code from raw decoded text.
///
/// Returns the uppercased code, or `None` if the payload does not contain
/// one. Pure; never mutates state.
pub fn extract_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if BARE_CODE.is_match(trimmed) {
        return Some(trimmed.to_ascii_uppercase());
    }

    URL_CODE
        .captures(trimmed)
        .map(|caps| caps[1].to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_code() {
        assert_eq!(
            extract_code("EVT-ABC123-XY12"),
            Some("EVT-ABC123-XY12".to_string())
        );
    }

    #[test]
    fn test_bare_code_case_insensitive() {
        assert_eq!(
            extract_code("evt-abc123-xy12"),
            Some("EVT-ABC123-XY12".to_string())
        );
        assert_eq!(
            extract_code("Evt-Abc123-Xy12"),
            Some("EVT-ABC123-XY12".to_string())
        );
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(
            extract_code("  EVT-ABC123-XY12\n"),
            Some("EVT-ABC123-XY12".to_string())
        );
    }

    #[test]
    fn test_url_payload() {
        assert_eq!(
            extract_code("https://tickets.example.com/e/42/ticket/EVT-ABC123-XY12"),
            Some("EVT-ABC123-XY12".to_string())
        );
    }

    #[test]
    fn test_url_payload_with_query() {
        assert_eq!(
            extract_code("https://tickets.example.com/ticket/EVT-ABC123-XY12?src=qr#top"),
            Some("EVT-ABC123-XY12".to_string())
        );
    }

    #[test]
    fn test_url_payload_lowercase() {
        assert_eq!(
            extract_code("https://example.com/ticket/evt-abc123-xy12"),
            Some("EVT-ABC123-XY12".to_string())
        );
    }

    #[test]
    fn test_url_trailing_path_segment_ignored() {
        assert_eq!(
            extract_code("https://example.com/ticket/EVT-ABC123-XY12/share"),
            Some("EVT-ABC123-XY12".to_string())
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(extract_code(""), None);
        assert_eq!(extract_code("   "), None);
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        assert_eq!(extract_code("TKT-ABC123-XY12"), None);
    }

    #[test]
    fn test_rejects_missing_segment() {
        assert_eq!(extract_code("EVT-ABC123"), None);
        assert_eq!(extract_code("EVT--XY12"), None);
    }

    #[test]
    fn test_rejects_arbitrary_text() {
        assert_eq!(extract_code("hello world"), None);
        assert_eq!(extract_code("https://example.com/about"), None);
    }

    #[test]
    fn test_rejects_code_with_trailing_garbage() {
        // Bare codes must match the whole payload.
        assert_eq!(extract_code("EVT-ABC123-XY12 extra"), None);
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert_eq!(extract_code("EVT-ABC_123-XY12"), None);
        assert_eq!(extract_code("EVT-ABC123-XY!2"), None);
    }
}
