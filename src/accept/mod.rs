//! Content negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Accept / Accept-Language / Accept-Charset header strings
//!     → range.rs (split clauses, validate per-axis grammar)
//!     → RequestAccept (three parsed headers, wildcard when absent)
//!
//! Candidate Representation (content type, language, charset, qs)
//!     → content_type.rs / language.rs / charset.rs (best range per axis)
//!     → RepresentationAcceptability (axes compared in order, then qs)
//!     → select_representation: best candidate, last one wins ties
//! ```
//!
//! # Design Decisions
//! - Header order is preserved; matching is a max-reduction over ranges
//! - An axis a representation does not declare scores below any declared axis
//! - Per-axis scores compare match precision before client quality

pub mod charset;
pub mod content_type;
pub mod language;
pub mod range;
pub mod types;

use std::fmt;

pub use charset::{
    parse_accept_charset_header, parse_charset_header, Charset, CharsetAccept,
    CharsetAcceptability, CharsetMatch,
};
pub use content_type::{
    parse_accept_header, parse_content_type_header, ContentType, ContentTypeAccept,
    ContentTypeAcceptability, ContentTypeMatch,
};
pub use language::{
    parse_accept_language_header, parse_language_header, Language, LanguageAccept,
    LanguageAcceptability, LanguageMatch,
};
pub use range::{split_accept_string, Accept, Axis, Range, RawRange};
pub use types::{Acceptability, HeaderError, MatchQuality, NotAcceptable};

use crate::observability::metrics;
use types::clamp_qs;

/// A value the server can offer on one negotiation axis.
pub trait Negotiable {
    type Axis: Axis;
    type Match: MatchQuality;

    /// Server quality, if declared.
    fn qs(&self) -> Option<f32>;

    /// Compare against a single range.
    fn match_range(&self, range: &Range<Self::Axis>) -> Result<Self::Match, NotAcceptable>;

    /// Best score over all ranges of a header.
    fn acceptability(
        &self,
        accept: &Accept<Self::Axis>,
    ) -> Result<Acceptability<Self::Match>, NotAcceptable> {
        let mut best: Option<Acceptability<Self::Match>> = None;

        for range in accept {
            let Ok(match_quality) = self.match_range(range) else {
                continue;
            };
            let candidate = Acceptability::new(match_quality, range.q(), self.qs());
            if best.as_ref().map_or(true, |b| candidate > *b) {
                best = Some(candidate);
            }
        }

        best.ok_or(NotAcceptable)
    }
}

impl<X: Axis> Accept<X> {
    /// Whether `value` matches any range.
    pub fn contains<V>(&self, value: &V) -> bool
    where
        V: Negotiable<Axis = X>,
    {
        value.acceptability(self).is_ok()
    }

    /// Score of `value` against this header, if it matches at all.
    pub fn get<V>(&self, value: &V) -> Option<Acceptability<V::Match>>
    where
        V: Negotiable<Axis = X>,
    {
        value.acceptability(self).ok()
    }
}

/// The three Accept-* headers of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestAccept {
    pub accept: ContentTypeAccept,
    pub accept_language: LanguageAccept,
    pub accept_charset: CharsetAccept,
}

impl RequestAccept {
    /// Parse raw header values. Missing or blank headers accept anything.
    pub fn from_headers(
        accept: Option<&str>,
        accept_language: Option<&str>,
        accept_charset: Option<&str>,
    ) -> Result<Self, HeaderError> {
        Ok(Self {
            accept: parse_or_wildcard(accept)?,
            accept_language: parse_or_wildcard(accept_language)?,
            accept_charset: parse_or_wildcard(accept_charset)?,
        })
    }

    pub fn with_accept(mut self, accept: ContentTypeAccept) -> Self {
        self.accept = accept;
        self
    }

    pub fn with_accept_language(mut self, accept_language: LanguageAccept) -> Self {
        self.accept_language = accept_language;
        self
    }

    pub fn with_accept_charset(mut self, accept_charset: CharsetAccept) -> Self {
        self.accept_charset = accept_charset;
        self
    }
}

impl Default for RequestAccept {
    fn default() -> Self {
        Self {
            accept: ContentTypeAccept::wildcard(),
            accept_language: LanguageAccept::wildcard(),
            accept_charset: CharsetAccept::wildcard(),
        }
    }
}

fn parse_or_wildcard<X: Axis>(header: Option<&str>) -> Result<Accept<X>, HeaderError> {
    match header.map(str::trim) {
        Some(header) if !header.is_empty() => Accept::parse(header),
        _ => Ok(Accept::wildcard()),
    }
}

/// A candidate response format: optional value per axis plus a server quality.
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    content_type: Option<ContentType>,
    language: Option<Language>,
    charset: Option<Charset>,
    qs: f32,
}

impl Representation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from optional raw strings.
    pub fn parse(
        content_type: Option<&str>,
        language: Option<&str>,
        charset: Option<&str>,
        qs: Option<f32>,
    ) -> Result<Self, HeaderError> {
        Ok(Self {
            content_type: content_type.map(ContentType::parse).transpose()?,
            language: language.map(Language::parse).transpose()?,
            charset: charset.map(Charset::parse).transpose()?,
            qs: qs.map_or(1.0, clamp_qs),
        })
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    pub fn with_qs(mut self, qs: f32) -> Self {
        self.qs = clamp_qs(qs);
        self
    }

    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    pub fn charset(&self) -> Option<&Charset> {
        self.charset.as_ref()
    }

    pub fn qs(&self) -> f32 {
        self.qs
    }

    /// Score against a request. Fails if any declared axis matches nothing.
    pub fn acceptability(
        &self,
        request: &RequestAccept,
    ) -> Result<RepresentationAcceptability, NotAcceptable> {
        Ok(RepresentationAcceptability {
            content_type: self
                .content_type
                .as_ref()
                .map(|v| v.acceptability(&request.accept))
                .transpose()?,
            language: self
                .language
                .as_ref()
                .map(|v| v.acceptability(&request.accept_language))
                .transpose()?,
            charset: self
                .charset
                .as_ref()
                .map(|v| v.acceptability(&request.accept_charset))
                .transpose()?,
            qs: self.qs,
        })
    }
}

impl Default for Representation {
    fn default() -> Self {
        Self {
            content_type: None,
            language: None,
            charset: None,
            qs: 1.0,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<Representation")?;
        if let Some(content_type) = &self.content_type {
            write!(f, " content_type={content_type}")?;
        }
        if let Some(language) = &self.language {
            write!(f, " language={language}")?;
        }
        if let Some(charset) = &self.charset {
            write!(f, " charset={charset}")?;
        }
        f.write_str(">")
    }
}

/// Composite score of a [`Representation`].
///
/// Compared field by field in declaration order. An undeclared axis is
/// `None` and sorts below any declared one.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RepresentationAcceptability {
    pub content_type: Option<ContentTypeAcceptability>,
    pub language: Option<LanguageAcceptability>,
    pub charset: Option<CharsetAcceptability>,
    pub qs: f32,
}

/// Anything that carries a [`Representation`], such as a dispatch binding.
pub trait HasRepresentation {
    fn representation(&self) -> &Representation;
}

impl HasRepresentation for Representation {
    fn representation(&self) -> &Representation {
        self
    }
}

/// Pick the candidate that best satisfies `request`.
///
/// Candidates that do not match are skipped. Among equal scores the last
/// candidate wins, so later registrations override earlier ones.
pub fn select_representation<'a, T, I>(
    candidates: I,
    request: &RequestAccept,
) -> Result<&'a T, NotAcceptable>
where
    T: HasRepresentation + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<(RepresentationAcceptability, &'a T)> = None;

    for candidate in candidates {
        let Ok(acceptability) = candidate.representation().acceptability(request) else {
            continue;
        };
        if best
            .as_ref()
            .map_or(true, |(highest, _)| acceptability >= *highest)
        {
            best = Some((acceptability, candidate));
        }
    }

    match best {
        Some((acceptability, candidate)) => {
            tracing::debug!(
                representation = %candidate.representation(),
                qs = acceptability.qs,
                "representation selected"
            );
            metrics::record_negotiation("selected");
            Ok(candidate)
        }
        None => {
            metrics::record_negotiation("not_acceptable");
            Err(NotAcceptable)
        }
    }
}
