//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for an
//! application's routing and dispatch tables. All types derive Serde traits
//! for deserialization from config files.

use http::method::InvalidMethod;
use http::Method;
use serde::{Deserialize, Serialize};

use crate::routing::{Params, RedirectTarget, Route};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Map-wide routing options.
    pub map: MapConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, in declaration order.
    pub routes: Vec<RouteConfig>,

    /// Bindings from endpoint and method to a named action.
    pub bindings: Vec<BindingConfig>,
}

/// Options shared by every route of a map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    /// Subdomain for routes that do not declare one.
    pub default_subdomain: String,

    /// Redirect branch URLs requested without their trailing slash.
    pub strict_slashes: bool,

    /// Redirect to the canonical URL when a simpler route supplies the
    /// matched values as defaults, and for alias routes.
    pub redirect_defaults: bool,

    /// Match on the full host instead of the subdomain.
    pub host_matching: bool,

    /// Sort query parameters appended while building.
    pub sort_parameters: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_subdomain: String::new(),
            strict_slashes: true,
            redirect_defaults: true,
            host_matching: false,
            sort_parameters: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// One route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path template, e.g. `/items/<int:page>`.
    pub path: String,

    /// Endpoint name the route resolves to.
    pub endpoint: String,

    /// Values supplied when the path does not carry them.
    #[serde(default)]
    pub defaults: Params,

    /// Subdomain template; the map default when absent.
    #[serde(default)]
    pub subdomain: Option<String>,

    /// Host template, used when the map matches on hosts.
    #[serde(default)]
    pub host: Option<String>,

    /// Overrides the map's trailing-slash policy.
    #[serde(default)]
    pub strict_slashes: Option<bool>,

    /// Only used for building, never matched.
    #[serde(default)]
    pub build_only: bool,

    /// Matches redirect to the canonical route of the endpoint.
    #[serde(default)]
    pub alias: bool,

    /// Redirect target with `<name>` placeholders.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

impl RouteConfig {
    /// Unbound route described by this entry.
    pub fn to_route(&self) -> Route {
        let mut route = Route::new(self.path.clone())
            .with_endpoint(self.endpoint.clone())
            .with_build_only(self.build_only)
            .with_alias(self.alias);

        if !self.defaults.is_empty() {
            route = route.with_defaults(self.defaults.clone());
        }
        if let Some(subdomain) = &self.subdomain {
            route = route.with_subdomain(subdomain.clone());
        }
        if let Some(host) = &self.host {
            route = route.with_host(host.clone());
        }
        if let Some(strict_slashes) = self.strict_slashes {
            route = route.with_strict_slashes(strict_slashes);
        }
        if let Some(target) = &self.redirect_to {
            route = route.with_redirect_to(RedirectTarget::Template(target.clone()));
        }
        route
    }
}

/// One dispatch binding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BindingConfig {
    /// Endpoint name, as produced by routing.
    pub endpoint: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Name of the action to run.
    pub action: String,

    /// Offered content type, e.g. `text/html`.
    #[serde(default)]
    pub content_type: Option<String>,

    /// Offered language tag.
    #[serde(default)]
    pub language: Option<String>,

    /// Offered charset.
    #[serde(default)]
    pub charset: Option<String>,

    /// Server-side quality in [0, 1].
    #[serde(default)]
    pub qs: Option<f32>,
}

impl BindingConfig {
    /// The binding's method, upper-cased so `get` binds `GET`.
    pub fn http_method(&self) -> Result<Method, InvalidMethod> {
        Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
    }
}

fn default_method() -> String {
    "GET".to_string()
}
