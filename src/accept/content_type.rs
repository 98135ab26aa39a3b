//! `Accept` header and content type values.

use std::fmt;
use std::str::FromStr;

use crate::accept::range::{self, Accept, Axis, Range};
use crate::accept::types::{clamp_qs, Acceptability, HeaderError, MatchQuality, NotAcceptable};
use crate::accept::Negotiable;

/// Grammar of the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTypeAxis;

impl Axis for ContentTypeAxis {
    const HEADER: &'static str = "Accept";
    const WILDCARD: &'static str = "*/*";
    const ACCEPTS_PARAMS: bool = true;

    fn is_valid_value(value: &str) -> bool {
        range::is_media_range(value)
    }
}

pub type ContentTypeRange = Range<ContentTypeAxis>;
pub type ContentTypeAccept = Accept<ContentTypeAxis>;
pub type ContentTypeAcceptability = Acceptability<ContentTypeMatch>;

fn split_media_type(value: &str) -> (&str, &str) {
    value.split_once('/').unwrap_or((value, ""))
}

impl Range<ContentTypeAxis> {
    pub fn media_type(&self) -> &str {
        split_media_type(self.value()).0
    }

    pub fn subtype(&self) -> &str {
        split_media_type(self.value()).1
    }
}

/// How a content type matched a media range.
///
/// `text/html` beats `text/*` beats `*/*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContentTypeMatch {
    pub type_matches: bool,
    pub subtype_matches: bool,
}

impl MatchQuality for ContentTypeMatch {
    fn is_exact(&self) -> bool {
        self.type_matches && self.subtype_matches
    }
}

impl Acceptability<ContentTypeMatch> {
    pub fn type_matches(&self) -> bool {
        self.match_quality().type_matches
    }

    pub fn subtype_matches(&self) -> bool {
        self.match_quality().subtype_matches
    }
}

/// A content type a server can produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentType {
    value: String,
    qs: Option<f32>,
}

impl ContentType {
    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        if !range::is_media_range(value) {
            return Err(HeaderError::InvalidValue {
                header: "Content-Type",
                value: value.to_string(),
            });
        }
        Ok(Self {
            value: value.to_string(),
            qs: None,
        })
    }

    /// Attach a server quality, clamped to `[0, 1]`.
    pub fn with_qs(mut self, qs: f32) -> Self {
        self.qs = Some(clamp_qs(qs));
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn qs(&self) -> Option<f32> {
        self.qs
    }

    pub fn media_type(&self) -> &str {
        split_media_type(&self.value).0
    }

    pub fn subtype(&self) -> &str {
        split_media_type(&self.value).1
    }

    pub fn to_header(&self) -> String {
        format!("{}/{}", self.media_type(), self.subtype())
    }
}

impl Negotiable for ContentType {
    type Axis = ContentTypeAxis;
    type Match = ContentTypeMatch;

    fn qs(&self) -> Option<f32> {
        self.qs
    }

    fn match_range(&self, range: &ContentTypeRange) -> Result<ContentTypeMatch, NotAcceptable> {
        let type_matches = if range.media_type().eq_ignore_ascii_case(self.media_type()) {
            true
        } else if range.media_type() == "*" {
            false
        } else {
            return Err(NotAcceptable);
        };

        let subtype_matches = if range.subtype().eq_ignore_ascii_case(self.subtype()) {
            true
        } else if range.subtype() == "*" {
            false
        } else {
            return Err(NotAcceptable);
        };

        Ok(ContentTypeMatch {
            type_matches,
            subtype_matches,
        })
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header())
    }
}

impl FromStr for ContentType {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse an `Accept` header.
pub fn parse_accept_header(header: &str) -> Result<ContentTypeAccept, HeaderError> {
    ContentTypeAccept::parse(header)
}

/// Parse a content type offered by the server.
pub fn parse_content_type_header(
    value: &str,
    qs: Option<f32>,
) -> Result<ContentType, HeaderError> {
    let content_type = ContentType::parse(value)?;
    Ok(match qs {
        Some(qs) => content_type.with_qs(qs),
        None => content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(values: &[&str]) -> ContentTypeAccept {
        ContentTypeAccept::from_values(values.iter().copied()).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let content_type = ContentType::parse("text/xml").unwrap();
        let acceptability = content_type.acceptability(&accept(&["text/xml"])).unwrap();
        assert!(acceptability.exact_match());
        assert!(acceptability.type_matches());
        assert!(acceptability.subtype_matches());
    }

    #[test]
    fn test_wildcard_match() {
        let content_type = ContentType::parse("text/xml").unwrap();

        let acceptability = content_type.acceptability(&accept(&["*/*"])).unwrap();
        assert!(!acceptability.exact_match());
        assert!(!acceptability.type_matches());

        let acceptability = content_type.acceptability(&accept(&["text/*"])).unwrap();
        assert!(!acceptability.exact_match());
        assert!(acceptability.type_matches());
        assert!(!acceptability.subtype_matches());
    }

    #[test]
    fn test_mismatch() {
        let content_type = ContentType::parse("text/xml").unwrap();
        assert_eq!(
            content_type.acceptability(&accept(&["application/xml"])),
            Err(NotAcceptable)
        );
        assert_eq!(
            content_type.acceptability(&accept(&["text/html"])),
            Err(NotAcceptable)
        );
    }

    #[test]
    fn test_best_range_wins() {
        let accept = parse_accept_header("*/*;q=1, text/*;q=0.2, text/html;q=0.1").unwrap();
        let content_type = ContentType::parse("text/html").unwrap();
        let acceptability = content_type.acceptability(&accept).unwrap();
        assert!(acceptability.exact_match());
        assert_eq!(acceptability.q(), 0.1);
    }

    #[test]
    fn test_qs_applied() {
        let content_type = parse_content_type_header("text/html", Some(0.5)).unwrap();
        let accept = parse_accept_header("text/html;q=0.5").unwrap();
        assert_eq!(content_type.acceptability(&accept).unwrap().quality(), 0.25);
    }

    #[test]
    fn test_accept_to_header() {
        let accept = parse_accept_header("application/json;q=0.5;speed=maximum").unwrap();
        assert_eq!(accept.to_header(), "application/json;q=0.5;speed=maximum");

        let range = accept.iter().next().unwrap();
        assert_eq!(range.media_type(), "application");
        assert_eq!(range.subtype(), "json");
        assert_eq!(range.params()["speed"], "maximum");
    }

    #[test]
    fn test_header_round_trip() {
        let header = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
        let accept = parse_accept_header(header).unwrap();
        assert_eq!(accept.to_header(), header);
        assert_eq!(parse_accept_header(&accept.to_header()).unwrap(), accept);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(parse_accept_header("text").is_err());
        assert!(parse_accept_header("*/html").is_err());
        assert!(parse_accept_header("text/html;q=high").is_err());
        assert!(ContentType::parse("html").is_err());
    }

    #[test]
    fn test_quality_clamped() {
        let accept = parse_accept_header("text/html;q=2, text/plain;q=-1").unwrap();
        let qs: Vec<f32> = accept.iter().map(|r| r.q()).collect();
        assert_eq!(qs, vec![1.0, 0.0]);
    }

    #[test]
    fn test_contains_and_get() {
        let accept = parse_accept_header("text/*").unwrap();
        let html = ContentType::parse("text/html").unwrap();
        let json = ContentType::parse("application/json").unwrap();
        assert!(accept.contains(&html));
        assert!(!accept.contains(&json));
        assert!(accept.get(&html).is_some());
        assert!(accept.get(&json).is_none());
    }

    #[test]
    fn test_match_ignores_case() {
        let content_type = ContentType::parse("text/html").unwrap();
        let acceptability = content_type.acceptability(&accept(&["Text/HTML"])).unwrap();
        assert!(acceptability.exact_match());
    }
}
