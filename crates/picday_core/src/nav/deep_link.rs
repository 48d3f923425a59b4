//! Deep-link matching for `scheme://host/diary/{YYYY-MM-DD}`.
//!
//! # Invariants
//! - Parsing never fails loudly: anything unmatched yields `None`.
//! - Scheme and host compare ASCII case-insensitively.
//! - The date must be a real calendar date.

use crate::config::DeepLinkConfig;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DIARY_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?P<host>[^/?#]+)/diary/(?P<date>\d{4}-\d{2}-\d{2})/?(?:[?#].*)?$",
    )
    .expect("valid diary link regex")
});

/// Matches deep links against one configured scheme/host pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkParser {
    scheme: String,
    host: String,
}

impl Default for DeepLinkParser {
    fn default() -> Self {
        Self::new(&DeepLinkConfig::default())
    }
}

impl DeepLinkParser {
    pub fn new(config: &DeepLinkConfig) -> Self {
        Self {
            scheme: config.scheme.trim().to_string(),
            host: config.host.trim().to_string(),
        }
    }

    /// Extracts the diary date from `uri`, or `None` when it does not match.
    pub fn parse_diary_date(&self, uri: &str) -> Option<NaiveDate> {
        let caps = DIARY_LINK_RE.captures(uri.trim())?;
        let scheme = caps.name("scheme")?.as_str();
        let host = caps.name("host")?.as_str();
        if !scheme.eq_ignore_ascii_case(&self.scheme) || !host.eq_ignore_ascii_case(&self.host) {
            return None;
        }
        NaiveDate::parse_from_str(caps.name("date")?.as_str(), "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::DeepLinkParser;
    use crate::config::DeepLinkConfig;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn parses_canonical_link() {
        let parser = DeepLinkParser::default();
        assert_eq!(
            parser.parse_diary_date("app://picday.co/diary/2026-01-22"),
            Some(date(2026, 1, 22))
        );
    }

    #[test]
    fn tolerates_whitespace_trailing_slash_and_query() {
        let parser = DeepLinkParser::default();
        assert_eq!(
            parser.parse_diary_date("  APP://PicDay.co/diary/2026-01-22/?from=widget "),
            Some(date(2026, 1, 22))
        );
        assert_eq!(
            parser.parse_diary_date("app://picday.co/diary/2026-01-22#top"),
            Some(date(2026, 1, 22))
        );
    }

    #[test]
    fn rejects_foreign_origin_and_bad_paths() {
        let parser = DeepLinkParser::default();
        assert_eq!(parser.parse_diary_date("https://picday.co/diary/2026-01-22"), None);
        assert_eq!(parser.parse_diary_date("app://other.co/diary/2026-01-22"), None);
        assert_eq!(parser.parse_diary_date("app://picday.co/calendar/2026-01-22"), None);
        assert_eq!(parser.parse_diary_date("app://picday.co/diary/2026-1-22"), None);
        assert_eq!(parser.parse_diary_date("app://picday.co/diary/2026-01-22/extra"), None);
        assert_eq!(parser.parse_diary_date("not-a-uri"), None);
        assert_eq!(parser.parse_diary_date(""), None);
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        let parser = DeepLinkParser::default();
        assert_eq!(parser.parse_diary_date("app://picday.co/diary/2026-02-30"), None);
        assert_eq!(parser.parse_diary_date("app://picday.co/diary/2026-13-01"), None);
    }

    #[test]
    fn honours_configured_origin() {
        let parser = DeepLinkParser::new(&DeepLinkConfig {
            scheme: "picday".to_string(),
            host: "open".to_string(),
        });
        assert_eq!(
            parser.parse_diary_date("picday://open/diary/2024-02-29"),
            Some(date(2024, 2, 29))
        );
        assert_eq!(parser.parse_diary_date("app://picday.co/diary/2024-02-29"), None);
    }
}
