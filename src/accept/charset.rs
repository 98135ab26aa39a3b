//! `Accept-Charset` header and charset names.

use std::fmt;
use std::str::FromStr;

use crate::accept::range::{self, Accept, Axis, Range};
use crate::accept::types::{clamp_qs, Acceptability, HeaderError, MatchQuality, NotAcceptable};
use crate::accept::Negotiable;

/// Grammar of the `Accept-Charset` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharsetAxis;

impl Axis for CharsetAxis {
    const HEADER: &'static str = "Accept-Charset";
    const WILDCARD: &'static str = "*";
    const ACCEPTS_PARAMS: bool = false;

    fn is_valid_value(value: &str) -> bool {
        range::is_token_or_wildcard(value)
    }
}

pub type CharsetRange = Range<CharsetAxis>;
pub type CharsetAccept = Accept<CharsetAxis>;
pub type CharsetAcceptability = Acceptability<CharsetMatch>;

/// Whether a charset was named explicitly or only matched by `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CharsetMatch {
    pub exact: bool,
}

impl MatchQuality for CharsetMatch {
    fn is_exact(&self) -> bool {
        self.exact
    }
}

/// A charset a server can produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Charset {
    value: String,
    qs: Option<f32>,
}

impl Charset {
    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        if !range::is_token_or_wildcard(value) {
            return Err(HeaderError::InvalidValue {
                header: "charset",
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

impl Negotiable for Charset {
    type Axis = CharsetAxis;
    type Match = CharsetMatch;

    fn qs(&self) -> Option<f32> {
        self.qs
    }

    fn match_range(&self, range: &CharsetRange) -> Result<CharsetMatch, NotAcceptable> {
        if range.value() == "*" {
            Ok(CharsetMatch { exact: false })
        } else if range.value().eq_ignore_ascii_case(&self.value) {
            Ok(CharsetMatch { exact: true })
        } else {
            Err(NotAcceptable)
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Charset {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse an `Accept-Charset` header.
pub fn parse_accept_charset_header(header: &str) -> Result<CharsetAccept, HeaderError> {
    CharsetAccept::parse(header)
}

/// Parse a charset offered by the server.
pub fn parse_charset_header(value: &str) -> Result<Charset, HeaderError> {
    Charset::parse(value)
}
