//! URL map: the bound route set and its match/build ordering.
//!
//! # Responsibilities
//! - Expand route factories and bind every resulting route
//! - Keep an index of routes by endpoint
//! - Sort lazily for matching (most specific first) and building
//!   (canonical, most defaults first)
//! - Hand out per-request [`MapAdapter`]s

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::schema::MapConfig;
use crate::routing::adapter::MapAdapter;
use crate::routing::converter::{default_converters, ConverterFactory, ConverterRegistry};
use crate::routing::encoding::SortKey;
use crate::routing::environ::Environ;
use crate::routing::error::{RouteError, RoutingResult};
use crate::routing::factory::RouteFactory;
use crate::routing::route::Route;

/// Routes in match and build order, computed after the last change.
struct Sorted {
    matching: Vec<Arc<Route>>,
    building: HashMap<String, Vec<Arc<Route>>>,
}

/// The set of routes an application answers to.
pub struct UrlMap {
    config: MapConfig,
    converters: ConverterRegistry,
    sort_key: Option<SortKey>,
    routes: Vec<Arc<Route>>,
    by_endpoint: IndexMap<String, Vec<Arc<Route>>>,
    sorted: OnceLock<Sorted>,
}

impl UrlMap {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            converters: default_converters(),
            sort_key: None,
            routes: Vec::new(),
            by_endpoint: IndexMap::new(),
            sorted: OnceLock::new(),
        }
    }

    /// Create a map and add `routes` to it.
    pub fn with_routes(config: MapConfig, routes: impl RouteFactory) -> RoutingResult<Self> {
        let mut map = Self::new(config);
        map.add_routes(routes)?;
        Ok(map)
    }

    /// Register or override a converter. Applies to routes added afterwards.
    pub fn add_converter(&mut self, name: impl Into<String>, factory: ConverterFactory) {
        self.converters.insert(name.into(), factory);
    }

    /// Comparator for query parameters appended while building.
    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = Some(key);
    }

    /// Expand `factory` and bind every route it yields.
    pub fn add_routes(&mut self, factory: impl RouteFactory) -> RoutingResult<()> {
        for mut route in factory.get_routes()? {
            route.bind(self, false)?;
            debug!(route = %route.rule(), endpoint = %route.endpoint(), "route added");

            let route = Arc::new(route);
            self.by_endpoint
                .entry(route.endpoint().to_string())
                .or_default()
                .push(Arc::clone(&route));
            self.routes.push(route);
        }
        self.sorted = OnceLock::new();
        Ok(())
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn sort_key(&self) -> Option<&SortKey> {
        self.sort_key.as_ref()
    }

    fn sorted(&self) -> &Sorted {
        self.sorted.get_or_init(|| {
            let mut matching = self.routes.clone();
            matching.sort_by_cached_key(|route| route.match_compare_key());

            let building = self
                .by_endpoint
                .iter()
                .map(|(endpoint, routes)| {
                    let mut routes = routes.clone();
                    routes.sort_by_cached_key(|route| route.build_compare_key());
                    (endpoint.clone(), routes)
                })
                .collect();

            Sorted { matching, building }
        })
    }

    /// Routes in the order they are tried when matching.
    pub(crate) fn match_routes(&self) -> &[Arc<Route>] {
        &self.sorted().matching
    }

    /// Routes for `endpoint` in the order they are tried when building.
    pub(crate) fn build_routes(&self, endpoint: &str) -> &[Arc<Route>] {
        self.sorted()
            .building
            .get(endpoint)
            .map_or(&[], Vec::as_slice)
    }

    /// Routes for `endpoint`, or all routes in match order.
    pub fn iter_routes<'a>(
        &'a self,
        endpoint: Option<&str>,
    ) -> Box<dyn Iterator<Item = &'a Arc<Route>> + 'a> {
        match endpoint {
            Some(endpoint) => Box::new(
                self.by_endpoint
                    .get(endpoint)
                    .into_iter()
                    .flat_map(|routes| routes.iter()),
            ),
            None => Box::new(self.match_routes().iter()),
        }
    }

    /// Whether any route for `endpoint` takes all of `arguments`.
    pub fn is_endpoint_expecting(&self, endpoint: &str, arguments: &[&str]) -> bool {
        self.by_endpoint.get(endpoint).is_some_and(|routes| {
            routes.iter().any(|route| {
                arguments
                    .iter()
                    .all(|arg| route.arguments().contains(*arg))
            })
        })
    }

    /// Bind to a server. `subdomain` defaults to the map's default subdomain.
    pub fn bind(&self, server_name: &str, subdomain: Option<&str>) -> RoutingResult<MapAdapter<'_>> {
        let subdomain = if self.config.host_matching {
            if subdomain.is_some() {
                return Err(RouteError::SubdomainWithHostMatching);
            }
            None
        } else {
            Some(
                subdomain
                    .map(str::to_string)
                    .unwrap_or_else(|| self.config.default_subdomain.clone()),
            )
        };

        let server_name = encode_idna(&server_name.to_lowercase());
        Ok(MapAdapter::new(self, server_name, subdomain))
    }

    /// Bind using the request environment.
    ///
    /// With a `server_name` hint and no explicit subdomain, the subdomain is
    /// whatever precedes the hint in the request host, or `<invalid>` when
    /// the request host is not under the hint.
    pub fn bind_to_environ(
        &self,
        environ: &Environ,
        server_name: Option<&str>,
        subdomain: Option<&str>,
    ) -> RoutingResult<MapAdapter<'_>> {
        let request_host = environ.host();

        let (server_name, subdomain) = match server_name {
            None => (request_host, subdomain.map(str::to_string)),
            Some(hint) if subdomain.is_none() && !self.config.host_matching => {
                let hint = hint.to_lowercase();
                let current = request_host.to_lowercase();
                let computed = subdomain_under(&current, &hint);
                (hint, Some(computed))
            }
            Some(hint) => (hint.to_string(), subdomain.map(str::to_string)),
        };

        let adapter = self
            .bind(&server_name, subdomain.as_deref())?
            .with_script_name(&environ.script_name)
            .with_url_scheme(&environ.url_scheme)
            .with_path_info(&environ.path_info);
        Ok(if environ.query_string.is_empty() {
            adapter
        } else {
            adapter.with_query_args(&environ.query_string)
        })
    }
}

impl Default for UrlMap {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl fmt::Debug for UrlMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UrlMap(")?;
        f.debug_list().entries(self.match_routes()).finish()?;
        f.write_str(")")
    }
}

/// Labels of `host` in front of `server_name`.
fn subdomain_under(host: &str, server_name: &str) -> String {
    let current: Vec<&str> = host.split('.').collect();
    let real: Vec<&str> = server_name.split('.').collect();

    if current.len() < real.len() || current[current.len() - real.len()..] != real[..] {
        return "<invalid>".to_string();
    }
    current[..current.len() - real.len()]
        .iter()
        .filter(|label| !label.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

/// IDNA-encode the host part of `server_name`, keeping any port.
fn encode_idna(server_name: &str) -> String {
    if server_name.is_ascii() {
        return server_name.to_string();
    }

    let (host, port) = match server_name.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => (host, Some(port)),
        _ => (server_name, None),
    };

    match url::Host::parse(host) {
        Ok(encoded) => match port {
            Some(port) => format!("{encoded}:{port}"),
            None => encoded.to_string(),
        },
        Err(err) => {
            warn!(server_name, error = %err, "server name is not a valid host");
            server_name.to_string()
        }
    }
}
