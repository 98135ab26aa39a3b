//! Routing errors and match signals.

use http::StatusCode;
use thiserror::Error;

use crate::routing::value::Params;

/// Errors raised while defining or compiling routes.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Route templates must be absolute paths.
    #[error("route {0:?} must start with a leading slash")]
    MissingLeadingSlash(String),

    /// The same placeholder appears twice in one template.
    #[error("variable name {0:?} used twice")]
    DuplicateVariable(String),

    /// Unparsed `<` or `>` left over after the last placeholder.
    #[error("malformed url route {0:?}")]
    Malformed(String),

    /// Placeholder names a converter the map does not know.
    #[error("the converter {0:?} does not exist")]
    UnknownConverter(String),

    /// Converter arguments rejected by the converter.
    #[error("invalid arguments for converter {converter:?}: {reason}")]
    InvalidConverterArguments { converter: String, reason: String },

    /// Route was bound a second time without rebinding.
    #[error("route {0:?} is already bound")]
    AlreadyBound(String),

    /// Route used before being bound to a map.
    #[error("route {0:?} is not bound")]
    NotBound(String),

    /// `bind` got a subdomain although the map matches on hosts.
    #[error("host matching enabled and a subdomain was provided")]
    SubdomainWithHostMatching,

    /// Compiled pattern rejected by the regex engine.
    #[error("invalid pattern for route {route:?}: {source}")]
    Regex {
        route: String,
        #[source]
        source: regex::Error,
    },

    /// Template variable missing from a route template context.
    #[error("unknown template variable {0:?}")]
    UnknownTemplateVariable(String),
}

pub type RoutingResult<T> = Result<T, RouteError>;

/// A converter rejected a value. The route simply does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value rejected by converter")]
pub struct ValidationError;

/// No route can build a URL for the endpoint with the given values.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("could not build url for endpoint {endpoint:?} with values {values:?}")]
pub struct BuildError {
    pub endpoint: String,
    pub values: Params,
}

/// Outcome of a failed match.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// No route matched the path.
    #[error("not found")]
    NotFound,

    /// The request should be redirected to the canonical URL.
    #[error("redirect to {new_url}")]
    RequestRedirect { new_url: String },

    /// A canonical URL was required but could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl MatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MatchError::NotFound => StatusCode::NOT_FOUND,
            MatchError::RequestRedirect { .. } => StatusCode::MOVED_PERMANENTLY,
            MatchError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Target URL if this is a redirect.
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            MatchError::RequestRedirect { new_url } => Some(new_url),
            _ => None,
        }
    }
}

/// Control flow raised by a single route while matching.
///
/// Never returned to callers of the adapter; it is turned into a
/// [`MatchError::RequestRedirect`] there.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchSignal {
    /// Branch route matched without its trailing slash.
    RequestSlash,

    /// Alias route matched; redirect to the canonical URL for these values.
    AliasRedirect(Params),
}
