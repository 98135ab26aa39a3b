//! Accept-* header grammar.
//!
//! # Responsibilities
//! - Split a header into `(value, q, params)` clauses
//! - Validate each clause against the grammar of its axis
//! - Serialize ranges back into header form
//!
//! # Design Decisions
//! - Clauses keep header order; quality is applied at match time
//! - `q` is clamped to `[0, 1]`, never sorted on
//! - Axis grammar is a type parameter so each header gets its own range type

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::accept::types::HeaderError;

const TOKEN: &str = r"[a-zA-Z0-9]+(?:-[a-zA-Z0-9]+)*";

static VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(?:{TOKEN}|\*)$")).expect("valid value grammar"));

static CONTENT_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:{TOKEN}|\*)/(?:(?:{TOKEN}\.)?{TOKEN}(?:\+{TOKEN})?|\*)$"
    ))
    .expect("valid content type grammar")
});

/// Returns true if `value` is a bare token or `*`.
pub(crate) fn is_token_or_wildcard(value: &str) -> bool {
    VALUE_RE.is_match(value)
}

/// Returns true if `value` is `type/subtype`, `type/*` or `*/*`.
pub(crate) fn is_media_range(value: &str) -> bool {
    if !CONTENT_TYPE_RE.is_match(value) {
        return false;
    }
    // `*/html` is syntactically a media range but names nothing.
    !matches!(value.split_once('/'), Some(("*", subtype)) if subtype != "*")
}

/// The grammar rules of one Accept-* header.
pub trait Axis {
    /// Header name, used in error messages.
    const HEADER: &'static str;

    /// Range that matches every value.
    const WILDCARD: &'static str;

    /// Whether ranges of this axis may carry parameters other than `q`.
    const ACCEPTS_PARAMS: bool;

    /// Check a range value against the axis grammar.
    fn is_valid_value(value: &str) -> bool;
}

/// One raw clause of an Accept-* header, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRange {
    pub value: String,
    pub q: String,
    pub params: IndexMap<String, String>,
}

/// Split an Accept-* header into its clauses.
///
/// Clauses are separated by `,`, parameters by `;`. A parameter named `q` is
/// pulled out as the quality and defaults to `"1.0"`. No grammar checks
/// happen here beyond requiring `key=value` parameters.
pub fn split_accept_string(header: &str) -> Result<Vec<RawRange>, HeaderError> {
    let mut ranges = Vec::new();

    for clause in header.split(',') {
        let mut parts = clause.split(';');
        let value = parts.next().unwrap_or_default().trim().to_string();

        let mut params = IndexMap::new();
        for param in parts {
            let (key, val) = param
                .split_once('=')
                .ok_or_else(|| HeaderError::InvalidParameter(param.to_string()))?;
            params.insert(key.trim().to_string(), val.trim().to_string());
        }

        let q = params.shift_remove("q").unwrap_or_else(|| "1.0".to_string());

        ranges.push(RawRange { value, q, params });
    }

    Ok(ranges)
}

/// One validated clause of an Accept-* header.
pub struct Range<X> {
    value: String,
    q: f32,
    params: IndexMap<String, String>,
    axis: PhantomData<X>,
}

impl<X: Axis> Range<X> {
    /// Create a range with quality 1 and no parameters.
    pub fn new(value: impl Into<String>) -> Result<Self, HeaderError> {
        Self::with_params(value, 1.0, IndexMap::new())
    }

    /// Create a range with an explicit quality.
    pub fn with_q(value: impl Into<String>, q: f32) -> Result<Self, HeaderError> {
        Self::with_params(value, q, IndexMap::new())
    }

    /// Create a range with quality and parameters.
    pub fn with_params(
        value: impl Into<String>,
        q: f32,
        params: IndexMap<String, String>,
    ) -> Result<Self, HeaderError> {
        let value = value.into();
        if !X::is_valid_value(&value) {
            return Err(HeaderError::InvalidValue {
                header: X::HEADER,
                value,
            });
        }
        if q.is_nan() {
            return Err(HeaderError::InvalidQuality(q.to_string()));
        }
        if !X::ACCEPTS_PARAMS && !params.is_empty() {
            return Err(HeaderError::UnexpectedParameters { header: X::HEADER });
        }

        Ok(Self {
            value,
            q: q.clamp(0.0, 1.0),
            params,
            axis: PhantomData,
        })
    }

    /// Validate a clause produced by [`split_accept_string`].
    pub fn from_raw(raw: RawRange) -> Result<Self, HeaderError> {
        let q = raw
            .q
            .parse::<f32>()
            .map_err(|_| HeaderError::InvalidQuality(raw.q.clone()))?;
        Self::with_params(raw.value, q, raw.params)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    /// Serialize as one header clause: value, then `q` if not 1, then params.
    pub fn to_header(&self) -> String {
        let mut header = self.value.clone();
        if self.q != 1.0 {
            header.push_str(&format!(";q={}", self.q));
        }
        for (key, value) in &self.params {
            header.push_str(&format!(";{key}={value}"));
        }
        header
    }
}

impl<X> fmt::Debug for Range<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range")
            .field("value", &self.value)
            .field("q", &self.q)
            .field("params", &self.params)
            .finish()
    }
}

impl<X> Clone for Range<X> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            q: self.q,
            params: self.params.clone(),
            axis: PhantomData,
        }
    }
}

impl<X> PartialEq for Range<X> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.q == other.q && self.params == other.params
    }
}

impl<X: Axis> fmt::Display for Range<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header())
    }
}

/// A parsed Accept-* header: ranges in header order.
pub struct Accept<X> {
    ranges: Vec<Range<X>>,
}

impl<X: Axis> Accept<X> {
    pub fn new(ranges: Vec<Range<X>>) -> Self {
        Self { ranges }
    }

    /// Parse a header string.
    pub fn parse(header: &str) -> Result<Self, HeaderError> {
        let ranges = split_accept_string(header)?
            .into_iter()
            .map(Range::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// The header a client sends when it accepts anything.
    pub fn wildcard() -> Self {
        Self {
            ranges: vec![Range {
                value: X::WILDCARD.to_string(),
                q: 1.0,
                params: IndexMap::new(),
                axis: PhantomData,
            }],
        }
    }

    /// Build from bare values, each with quality 1.
    pub fn from_values<I, S>(values: I) -> Result<Self, HeaderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .map(Range::new)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Range<X>> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Serialize back into an equivalent header string.
    pub fn to_header(&self) -> String {
        self.ranges
            .iter()
            .map(Range::to_header)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<X> fmt::Debug for Accept<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges.iter()).finish()
    }
}

impl<X> Clone for Accept<X> {
    fn clone(&self) -> Self {
        Self {
            ranges: self.ranges.clone(),
        }
    }
}

impl<X> PartialEq for Accept<X> {
    fn eq(&self, other: &Self) -> bool {
        self.ranges == other.ranges
    }
}

impl<X: Axis> fmt::Display for Accept<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header())
    }
}

impl<X: Axis> FromStr for Accept<X> {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'a, X> IntoIterator for &'a Accept<X> {
    type Item = &'a Range<X>;
    type IntoIter = std::slice::Iter<'a, Range<X>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
