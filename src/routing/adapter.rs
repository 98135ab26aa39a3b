//! Per-request view of a [`UrlMap`].
//!
//! # Responsibilities
//! - Match a path against the map, turning route signals into redirects
//! - Redirect to canonical URLs for aliases and defaulted routes
//! - Build relative or absolute URLs for an endpoint

use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::observability::metrics;
use crate::routing::encoding::{quote, url_encode, PATH_SAFE, VALUE_SAFE};
use crate::routing::error::{BuildError, MatchError, MatchSignal};
use crate::routing::map::UrlMap;
use crate::routing::route::{RedirectTarget, Route};
use crate::routing::value::Params;

static REDIRECT_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]+)>").expect("valid placeholder grammar"));

/// A successful match.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub endpoint: String,
    pub params: Params,
    pub route: Arc<Route>,
}

/// A [`UrlMap`] bound to a server, script root and scheme.
///
/// Created by [`UrlMap::bind`] or [`UrlMap::bind_to_environ`]. Cheap to
/// create and meant to live for a single request.
#[derive(Debug, Clone)]
pub struct MapAdapter<'m> {
    map: &'m UrlMap,
    server_name: String,
    script_name: String,
    /// `None` when the map matches on hosts.
    subdomain: Option<String>,
    url_scheme: String,
    path_info: String,
    query_args: Option<String>,
}

impl<'m> MapAdapter<'m> {
    pub(crate) fn new(map: &'m UrlMap, server_name: String, subdomain: Option<String>) -> Self {
        Self {
            map,
            server_name,
            script_name: "/".to_string(),
            subdomain,
            url_scheme: "http".to_string(),
            path_info: "/".to_string(),
            query_args: None,
        }
    }

    /// Mount point. Always stored with a trailing slash.
    pub fn with_script_name(mut self, script_name: &str) -> Self {
        self.script_name = script_name.to_string();
        if !self.script_name.ends_with('/') {
            self.script_name.push('/');
        }
        self
    }

    pub fn with_url_scheme(mut self, url_scheme: &str) -> Self {
        self.url_scheme = url_scheme.to_string();
        self
    }

    /// Path used by [`MapAdapter::match_current`].
    pub fn with_path_info(mut self, path_info: &str) -> Self {
        self.path_info = path_info.to_string();
        self
    }

    /// Query string appended to redirects.
    pub fn with_query_args(mut self, query_args: &str) -> Self {
        self.query_args = Some(query_args.to_string());
        self
    }

    /// Query arguments given as values, form-encoded.
    pub fn with_query_params(mut self, query_args: &Params) -> Self {
        let pairs = query_args
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.query_args = Some(url_encode(pairs, false, None));
        self
    }

    pub fn map(&self) -> &'m UrlMap {
        self.map
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    pub fn subdomain(&self) -> Option<&str> {
        self.subdomain.as_deref()
    }

    pub fn url_scheme(&self) -> &str {
        &self.url_scheme
    }

    /// Match the path given at bind time.
    pub fn match_current(&self) -> Result<RouteMatch, MatchError> {
        self.match_with_query(&self.path_info, self.query_args.as_deref())
    }

    /// Match `path_info`, using the bound query for redirects.
    pub fn match_path(&self, path_info: &str) -> Result<RouteMatch, MatchError> {
        self.match_with_query(path_info, self.query_args.as_deref())
    }

    /// Match `path_info`.
    ///
    /// `query_args` is only carried over onto redirect targets; it never
    /// takes part in matching.
    pub fn match_with_query(
        &self,
        path_info: &str,
        query_args: Option<&str>,
    ) -> Result<RouteMatch, MatchError> {
        let result = self.resolve(path_info, query_args);
        match &result {
            Ok(found) => {
                debug!(path = path_info, endpoint = %found.endpoint, "route matched");
                metrics::record_route_match("matched");
            }
            Err(MatchError::NotFound) => {
                debug!(path = path_info, "no route matched");
                metrics::record_route_match("not_found");
            }
            Err(MatchError::Build(err)) => {
                debug!(path = path_info, error = %err, "canonical url build failed");
                metrics::record_route_match("build_failed");
            }
            Err(err) => {
                debug!(path = path_info, error = %err, "redirecting");
                metrics::record_route_match("redirect");
            }
        }
        result
    }

    fn resolve(&self, path_info: &str, query_args: Option<&str>) -> Result<RouteMatch, MatchError> {
        let domain = if self.map.config().host_matching {
            self.server_name.as_str()
        } else {
            self.subdomain.as_deref().unwrap_or_default()
        };
        let path = format!("{}|/{}", domain, path_info.trim_start_matches('/'));

        for route in self.map.match_routes() {
            let params = match route.match_path(&path) {
                Ok(Some(params)) => params,
                Ok(None) => continue,
                Err(MatchSignal::RequestSlash) => {
                    let new_url = self.make_redirect_url(
                        &format!("{}/", quote(path_info, PATH_SAFE)),
                        query_args,
                        None,
                    );
                    return Err(MatchError::RequestRedirect { new_url });
                }
                Err(MatchSignal::AliasRedirect(values)) => {
                    let new_url = self.make_alias_redirect_url(
                        path_info,
                        route.endpoint(),
                        &values,
                        query_args,
                    )?;
                    return Err(MatchError::RequestRedirect { new_url });
                }
            };

            if self.map.config().redirect_defaults {
                if let Some(new_url) = self.get_default_redirect(route, &params, query_args) {
                    return Err(MatchError::RequestRedirect { new_url });
                }
            }

            if let Some(target) = route.redirect_to() {
                let new_url = self.redirect_to(route, target, &params);
                return Err(MatchError::RequestRedirect { new_url });
            }

            return Ok(RouteMatch {
                endpoint: route.endpoint().to_string(),
                params,
                route: Arc::clone(route),
            });
        }

        Err(MatchError::NotFound)
    }

    /// Whether `path_info` matches or redirects.
    pub fn test(&self, path_info: &str) -> bool {
        matches!(
            self.resolve(path_info, None),
            Ok(_) | Err(MatchError::RequestRedirect { .. })
        )
    }

    /// Full host name for a domain part.
    ///
    /// The domain part is a host when host matching, otherwise a subdomain.
    pub fn get_host(&self, domain_part: Option<&str>) -> String {
        if self.map.config().host_matching {
            return match domain_part.filter(|d| !d.is_empty()) {
                Some(host) => host.to_string(),
                None => self.server_name.clone(),
            };
        }
        let subdomain = domain_part.or(self.subdomain.as_deref()).unwrap_or_default();
        if subdomain.is_empty() {
            self.server_name.clone()
        } else {
            format!("{}.{}", subdomain, self.server_name)
        }
    }

    /// Absolute URL for `path_info` under the script root.
    pub fn make_redirect_url(
        &self,
        path_info: &str,
        query_args: Option<&str>,
        domain_part: Option<&str>,
    ) -> String {
        let root = self
            .script_name
            .strip_suffix('/')
            .unwrap_or(&self.script_name)
            .trim_start_matches('/');
        let path = join_path(root, path_info.trim_start_matches('/'));
        let suffix = match query_args.filter(|q| !q.is_empty()) {
            Some(query) => format!("?{query}"),
            None => String::new(),
        };
        format!(
            "{}://{}/{}{}",
            self.url_scheme,
            self.get_host(domain_part),
            path,
            suffix
        )
    }

    /// Canonical URL for an alias match.
    ///
    /// Fails when the only route that builds is the alias itself, which
    /// would redirect to the requested URL.
    fn make_alias_redirect_url(
        &self,
        path_info: &str,
        endpoint: &str,
        values: &Params,
        query_args: Option<&str>,
    ) -> Result<String, BuildError> {
        let mut url = self.build_with(endpoint, values, true, false)?;
        let current = self.make_redirect_url(&quote(path_info, PATH_SAFE), None, None);
        if url == current {
            warn!(path = path_info, endpoint, "alias has no canonical route");
            return Err(BuildError {
                endpoint: endpoint.to_string(),
                values: values.clone(),
            });
        }
        if let Some(query) = query_args.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        Ok(url)
    }

    /// Canonical URL when an earlier build route supplies `values` as defaults.
    fn get_default_redirect(
        &self,
        route: &Arc<Route>,
        values: &Params,
        query_args: Option<&str>,
    ) -> Option<String> {
        for candidate in self.map.build_routes(route.endpoint()) {
            if Arc::ptr_eq(candidate, route) {
                break;
            }
            if !candidate.provides_defaults_for(route) || !candidate.suitable_for(values) {
                continue;
            }

            let mut values = values.clone();
            if let Some(defaults) = candidate.defaults() {
                values.extend(defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            if let Some((domain_part, path)) = candidate.build(&values, true) {
                return Some(self.make_redirect_url(&path, query_args, Some(&domain_part)));
            }
        }
        None
    }

    fn redirect_to(&self, route: &Route, target: &RedirectTarget, params: &Params) -> String {
        let relative = match target {
            RedirectTarget::Template(template) => REDIRECT_PLACEHOLDER_RE
                .replace_all(template, |caps: &Captures<'_>| {
                    let name = &caps[1];
                    let Some(value) = params.get(name) else {
                        return String::new();
                    };
                    route
                        .converter(name)
                        .and_then(|converter| converter.to_url(value).ok())
                        .unwrap_or_else(|| quote(&value.to_string(), VALUE_SAFE))
                })
                .into_owned(),
            RedirectTarget::Callback(callback) => callback(self, params),
        };

        let host = match self.subdomain.as_deref().filter(|s| !s.is_empty()) {
            Some(subdomain) => format!("{}.{}", subdomain, self.server_name),
            None => self.server_name.clone(),
        };
        let base = format!("{}://{}{}", self.url_scheme, host, self.script_name);

        match url::Url::parse(&base).and_then(|base| base.join(&relative)) {
            Ok(joined) => joined.to_string(),
            Err(_) => format!("{}{}", base, relative.trim_start_matches('/')),
        }
    }

    /// Build a URL for `endpoint`, appending unknown values as a query.
    ///
    /// The URL is relative to the server unless the route lives on another
    /// subdomain or host.
    pub fn build(&self, endpoint: &str, values: &Params) -> Result<String, BuildError> {
        self.build_with(endpoint, values, false, true)
    }

    pub fn build_with(
        &self,
        endpoint: &str,
        values: &Params,
        force_external: bool,
        append_unknown: bool,
    ) -> Result<String, BuildError> {
        let built = self
            .map
            .build_routes(endpoint)
            .iter()
            .filter(|route| route.suitable_for(values))
            .find_map(|route| route.build(values, append_unknown));

        let Some((domain_part, path)) = built else {
            debug!(endpoint, "no route could build url");
            metrics::record_url_build("failed");
            return Err(BuildError {
                endpoint: endpoint.to_string(),
                values: values.clone(),
            });
        };
        metrics::record_url_build("built");

        let host = self.get_host(Some(&domain_part));
        let path = path.trim_start_matches('/');

        if !force_external {
            let same_origin = if self.map.config().host_matching {
                host == self.server_name
            } else {
                Some(domain_part.as_str()) == self.subdomain.as_deref()
            };
            if same_origin {
                return Ok(format!("{}{}", self.script_name, path));
            }
        }

        Ok(format!(
            "{}://{}{}/{}",
            self.url_scheme,
            host,
            self.script_name.strip_suffix('/').unwrap_or(&self.script_name),
            path
        ))
    }
}

/// Join two relative path pieces with a single slash.
fn join_path(base: &str, path: &str) -> String {
    if base.is_empty() || path.starts_with('/') {
        path.to_string()
    } else if base.ends_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
