//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (when routes are added):
//!     RouteFactory (Route, Subdomain, Submount, EndpointPrefix, RouteTemplate)
//!     → parser.rs (split template, parse converter arguments)
//!     → converter.rs (instantiate converters from the map's registry)
//!     → route.rs (regex + trace + weights, bound to the map)
//!     → map.rs (index by endpoint, sort lazily on next lookup)
//!
//! Matching (per request):
//!     UrlMap::bind / bind_to_environ
//!     → adapter.rs ("subdomain|/path" against routes in match order)
//!     → RouteMatch, or MatchError (NotFound / RequestRedirect)
//!
//! Building:
//!     endpoint + Params
//!     → adapter.rs (first suitable route in build order)
//!     → relative path, or absolute URL on another subdomain or host
//! ```
//!
//! # Design Decisions
//! - Routes are compiled once at bind time; matching is regex only
//! - Subdomain (or host) and path are matched as a single string
//! - Most specific route wins: static segments beat typed converters, which
//!   beat catch-all paths
//! - Trailing-slash and canonical-URL redirects are errors carrying the
//!   absolute target, never silent rewrites

pub mod adapter;
pub mod converter;
pub mod encoding;
pub mod environ;
pub mod error;
pub mod factory;
pub mod map;
pub mod parser;
pub mod route;
pub mod value;

pub use adapter::{MapAdapter, RouteMatch};
pub use converter::{
    default_converters, AnyConverter, Converter, ConverterFactory, ConverterRegistry,
    FloatConverter, IntegerConverter, PathConverter, StringConverter, UuidConverter,
};
pub use encoding::SortKey;
pub use environ::Environ;
pub use error::{BuildError, MatchError, RouteError, RoutingResult, ValidationError};
pub use factory::{
    EndpointPrefix, RouteFactory, RouteTemplate, RouteTemplateFactory, Submount, Subdomain,
};
pub use map::UrlMap;
pub use parser::{parse_converter_args, ConverterArg, ConverterArgs};
pub use route::{RedirectCallback, RedirectTarget, Route};
pub use value::{params, Params, Value};
