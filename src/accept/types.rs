//! Shared negotiation types.

use std::cmp::Ordering;

use thiserror::Error;

/// Raised when no candidate matches the client's Accept-* headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not acceptable")]
pub struct NotAcceptable;

/// Errors raised while parsing Accept-* headers or negotiable values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// A `;` separated parameter without `=`.
    #[error("invalid parameter: {0:?}")]
    InvalidParameter(String),

    /// Value does not follow the grammar of its header.
    #[error("invalid {header} value: {value:?}")]
    InvalidValue { header: &'static str, value: String },

    /// Quality that is not a number.
    #[error("invalid quality value: {0:?}")]
    InvalidQuality(String),

    /// Parameters on a header that does not allow them.
    #[error("{header} ranges do not take parameters")]
    UnexpectedParameters { header: &'static str },
}

/// Per-axis description of how precisely a value matched a range.
pub trait MatchQuality: Ord + Copy {
    /// Whether the match involved no wildcard or prefix.
    fn is_exact(&self) -> bool;
}

/// Score of one negotiable value against one Accept-* header.
///
/// Ordered by match quality first, then by `q * qs`.
#[derive(Debug, Clone, Copy)]
pub struct Acceptability<M> {
    match_quality: M,
    q: f32,
    qs: Option<f32>,
}

impl<M: MatchQuality> Acceptability<M> {
    pub fn new(match_quality: M, q: f32, qs: Option<f32>) -> Self {
        Self {
            match_quality,
            q,
            qs,
        }
    }

    pub fn match_quality(&self) -> M {
        self.match_quality
    }

    /// Client quality of the matched range.
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Server quality of the value, if it declared one.
    pub fn qs(&self) -> Option<f32> {
        self.qs
    }

    pub fn quality(&self) -> f32 {
        match self.qs {
            Some(qs) => self.q * qs,
            None => self.q,
        }
    }

    pub fn exact_match(&self) -> bool {
        self.match_quality.is_exact()
    }
}

impl<M: MatchQuality> PartialEq for Acceptability<M> {
    fn eq(&self, other: &Self) -> bool {
        self.match_quality == other.match_quality && self.quality() == other.quality()
    }
}

impl<M: MatchQuality> PartialOrd for Acceptability<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.match_quality.cmp(&other.match_quality) {
            Ordering::Equal => self.quality().partial_cmp(&other.quality()),
            ordering => Some(ordering),
        }
    }
}

/// Clamp a server quality into `[0, 1]`.
pub(crate) fn clamp_qs(qs: f32) -> f32 {
    if qs.is_nan() {
        0.0
    } else {
        qs.clamp(0.0, 1.0)
    }
}
