//! `Accept-Language` header and language tags.

use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

use crate::accept::range::{self, Accept, Axis, Range};
use crate::accept::types::{clamp_qs, Acceptability, HeaderError, MatchQuality, NotAcceptable};
use crate::accept::Negotiable;

/// Grammar of the `Accept-Language` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageAxis;

impl Axis for LanguageAxis {
    const HEADER: &'static str = "Accept-Language";
    const WILDCARD: &'static str = "*";
    const ACCEPTS_PARAMS: bool = false;

    fn is_valid_value(value: &str) -> bool {
        range::is_token_or_wildcard(value)
    }
}

pub type LanguageRange = Range<LanguageAxis>;
pub type LanguageAccept = Accept<LanguageAxis>;
pub type LanguageAcceptability = Acceptability<LanguageMatch>;

/// How a language tag matched a language range.
///
/// `specificity` counts the segments of the range that matched, `tail` the
/// segments of the tag left over. Fewer leftovers rank first, then more
/// specific ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageMatch {
    pub specificity: usize,
    pub tail: usize,
}

impl LanguageMatch {
    fn key(&self) -> (Reverse<usize>, usize) {
        (Reverse(self.tail), self.specificity)
    }
}

impl Ord for LanguageMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for LanguageMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl MatchQuality for LanguageMatch {
    fn is_exact(&self) -> bool {
        self.tail == 0
    }
}

impl Acceptability<LanguageMatch> {
    pub fn specificity(&self) -> usize {
        self.match_quality().specificity
    }

    pub fn tail(&self) -> usize {
        self.match_quality().tail
    }
}

fn segments(value: &str) -> usize {
    value.split('-').count()
}

/// A language a server can produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    value: String,
    qs: Option<f32>,
}

impl Language {
    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        if !range::is_token_or_wildcard(value) {
            return Err(HeaderError::InvalidValue {
                header: "Content-Language",
                value: value.to_string(),
            });
        }
        Ok(Self {
            value: value.to_string(),
            qs: None,
        })
    }

    pub fn with_qs(mut self, qs: f32) -> Self {
        self.qs = Some(clamp_qs(qs));
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn to_header(&self) -> String {
        self.value.clone()
    }
}

impl Negotiable for Language {
    type Axis = LanguageAxis;
    type Match = LanguageMatch;

    fn qs(&self) -> Option<f32> {
        self.qs
    }

    fn match_range(&self, range: &LanguageRange) -> Result<LanguageMatch, NotAcceptable> {
        // Tags compare case-insensitively.
        let option = range.value().to_ascii_lowercase();
        let value = self.value.to_ascii_lowercase();

        if value == option {
            Ok(LanguageMatch {
                specificity: segments(&option),
                tail: 0,
            })
        } else if value
            .strip_prefix(option.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
        {
            let specificity = segments(&option);
            Ok(LanguageMatch {
                specificity,
                tail: segments(&value) - specificity,
            })
        } else if option == "*" {
            Ok(LanguageMatch {
                specificity: 0,
                tail: segments(&value),
            })
        } else {
            Err(NotAcceptable)
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Language {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse an `Accept-Language` header.
pub fn parse_accept_language_header(header: &str) -> Result<LanguageAccept, HeaderError> {
    LanguageAccept::parse(header)
}

/// Parse a language tag offered by the server.
pub fn parse_language_header(value: &str) -> Result<Language, HeaderError> {
    Language::parse(value)
}
