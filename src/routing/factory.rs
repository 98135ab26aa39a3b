//! Route factories.
//!
//! A factory yields routes to add to a map. [`Route`] is the trivial
//! factory; the others wrap child factories and rewrite the routes they
//! produce.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::routing::error::{RouteError, RoutingResult};
use crate::routing::route::Route;
use crate::routing::value::{Params, Value};

static TEMPLATE_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:([a-zA-Z_][a-zA-Z0-9_]*)|\{([a-zA-Z_][a-zA-Z0-9_]*)\})")
        .expect("valid template variable grammar")
});

/// Source of unbound routes.
pub trait RouteFactory {
    fn get_routes(&self) -> RoutingResult<Vec<Route>>;

    fn boxed(self) -> Box<dyn RouteFactory>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl RouteFactory for Route {
    fn get_routes(&self) -> RoutingResult<Vec<Route>> {
        Ok(vec![self.clone()])
    }
}

impl<F: RouteFactory + ?Sized> RouteFactory for Box<F> {
    fn get_routes(&self) -> RoutingResult<Vec<Route>> {
        (**self).get_routes()
    }
}

impl<F: RouteFactory + ?Sized> RouteFactory for Arc<F> {
    fn get_routes(&self) -> RoutingResult<Vec<Route>> {
        (**self).get_routes()
    }
}

impl<F: RouteFactory> RouteFactory for Vec<F> {
    fn get_routes(&self) -> RoutingResult<Vec<Route>> {
        let mut routes = Vec::new();
        for factory in self {
            routes.extend(factory.get_routes()?);
        }
        Ok(routes)
    }
}

/// Puts every child route on the given subdomain.
///
/// ```text
/// Subdomain("<string(length=2):lang_code>", [Route("/about")])
/// ```
pub struct Subdomain {
    subdomain: String,
    routes: Box<dyn RouteFactory>,
}

impl Subdomain {
    pub fn new(subdomain: impl Into<String>, routes: impl RouteFactory + 'static) -> Self {
        Self {
            subdomain: subdomain.into(),
            routes: Box::new(routes),
        }
    }
}

impl RouteFactory for Subdomain {
    fn get_routes(&self) -> RoutingResult<Vec<Route>> {
        Ok(self
            .routes
            .get_routes()?
            .into_iter()
            .map(|route| route.empty().with_subdomain(self.subdomain.clone()))
            .collect())
    }
}

/// Prefixes every child route with a path.
pub struct Submount {
    path: String,
    routes: Box<dyn RouteFactory>,
}

impl Submount {
    pub fn new(path: &str, routes: impl RouteFactory + 'static) -> Self {
        Self {
            path: path.trim_end_matches('/').to_string(),
            routes: Box::new(routes),
        }
    }
}

impl RouteFactory for Submount {
    fn get_routes(&self) -> RoutingResult<Vec<Route>> {
        Ok(self
            .routes
            .get_routes()?
            .into_iter()
            .map(|route| {
                let rule = format!("{}{}", self.path, route.rule());
                route.empty().with_rule(rule)
            })
            .collect())
    }
}

/// Prefixes every child endpoint.
pub struct EndpointPrefix {
    prefix: String,
    routes: Box<dyn RouteFactory>,
}

impl EndpointPrefix {
    pub fn new(prefix: impl Into<String>, routes: impl RouteFactory + 'static) -> Self {
        Self {
            prefix: prefix.into(),
            routes: Box::new(routes),
        }
    }
}

impl RouteFactory for EndpointPrefix {
    fn get_routes(&self) -> RoutingResult<Vec<Route>> {
        Ok(self
            .routes
            .get_routes()?
            .into_iter()
            .map(|route| {
                let endpoint = format!("{}{}", self.prefix, route.endpoint());
                route.empty().with_endpoint(endpoint)
            })
            .collect())
    }
}

/// Reusable set of routes with `$name` / `${name}` placeholders.
///
/// ```text
/// resource = RouteTemplate([Route("/$name/", endpoint="$name.list")])
/// resource.apply({name: "user"})  → Route("/user/", endpoint="user.list")
/// ```
#[derive(Clone)]
pub struct RouteTemplate {
    routes: Rc<dyn RouteFactory>,
}

impl RouteTemplate {
    pub fn new(routes: impl RouteFactory + 'static) -> Self {
        Self {
            routes: Rc::new(routes),
        }
    }

    /// Bind template variables, producing a factory.
    pub fn apply<I, K, V>(&self, context: I) -> RouteTemplateFactory
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RouteTemplateFactory {
            routes: Rc::clone(&self.routes),
            context: context
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A [`RouteTemplate`] with its variables filled in.
pub struct RouteTemplateFactory {
    routes: Rc<dyn RouteFactory>,
    context: HashMap<String, String>,
}

impl RouteTemplateFactory {
    fn format(&self, template: &str) -> RoutingResult<String> {
        let mut missing = None;
        let formatted = TEMPLATE_VAR_RE.replace_all(template, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            match self.context.get(name) {
                Some(value) => value.clone(),
                None => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(RouteError::UnknownTemplateVariable(name)),
            None => Ok(formatted.into_owned()),
        }
    }

    fn expand(&self, route: &Route) -> RoutingResult<Route> {
        let mut expanded = route
            .empty()
            .with_rule(self.format(route.rule())?)
            .with_endpoint(self.format(route.endpoint())?);

        if let Some(subdomain) = route.subdomain() {
            expanded = expanded.with_subdomain(self.format(subdomain)?);
        }

        if let Some(defaults) = route.defaults() {
            let mut formatted = Params::new();
            for (key, value) in defaults {
                let value = match value {
                    Value::Str(s) => Value::Str(self.format(s)?),
                    other => other.clone(),
                };
                formatted.insert(key.clone(), value);
            }
            expanded = expanded.with_defaults(formatted);
        }

        Ok(expanded)
    }
}

impl RouteFactory for RouteTemplateFactory {
    fn get_routes(&self) -> RoutingResult<Vec<Route>> {
        self.routes
            .get_routes()?
            .iter()
            .map(|route| self.expand(route))
            .collect()
    }
}
