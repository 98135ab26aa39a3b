//! Route definition and compilation.
//!
//! # Responsibilities
//! - Hold one path template with its endpoint, defaults and options
//! - Compile the template into a regex and a trace when bound to a map
//! - Match `"domain|/path"` strings and build URLs back from values
//! - Provide the sort keys used for matching and building order
//!
//! # Design Decisions
//! - Routes are plain values until bound; only bound routes match or build
//! - Domain and path are matched together, separated by `|`
//! - Branch routes (trailing `/`) take an optional trailing slash that is
//!   checked outside the regex, so the compiled pattern needs no lookbehind

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::routing::adapter::MapAdapter;
use crate::routing::converter::Converter;
use crate::routing::encoding::{quote, url_encode, SortKey, PATH_SAFE};
use crate::routing::error::{MatchSignal, RouteError, RoutingResult};
use crate::routing::map::UrlMap;
use crate::routing::parser::{parse_converter_args, parse_route, ConverterArgs, RoutePart};
use crate::routing::value::{Params, Value};

/// Computes a redirect target from the adapter and the matched values.
pub type RedirectCallback = Arc<dyn Fn(&MapAdapter<'_>, &Params) -> String + Send + Sync>;

/// Where a matching route redirects to instead of returning a match.
#[derive(Clone)]
pub enum RedirectTarget {
    /// Relative URL with `<name>` placeholders filled from the match.
    Template(String),
    Callback(RedirectCallback),
}

impl fmt::Debug for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectTarget::Template(template) => f.debug_tuple("Template").field(template).finish(),
            RedirectTarget::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// One element of a compiled route, in template order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracePart {
    pub dynamic: bool,
    pub data: String,
}

/// Sort key for matching: argument-free routes, then longer, then lighter.
pub type MatchKey = (bool, isize, Vec<(u8, i64)>);

/// Sort key for building: canonical routes, then more arguments and defaults.
pub type BuildKey = (u8, isize, isize);

#[derive(Clone)]
struct BoundSettings {
    redirect_defaults: bool,
    sort_parameters: bool,
    sort_key: Option<SortKey>,
}

#[derive(Clone)]
struct Compiled {
    trace: Vec<TracePart>,
    converters: HashMap<String, Arc<dyn Converter>>,
    weights: Vec<(u8, i64)>,
    regex: Option<Regex>,
    optional_slash: bool,
    strict_slashes: bool,
    subdomain: String,
    settings: BoundSettings,
}

/// A path template bound to an endpoint.
#[derive(Clone)]
pub struct Route {
    rule: String,
    endpoint: String,
    defaults: Option<Params>,
    subdomain: Option<String>,
    host: Option<String>,
    strict_slashes: Option<bool>,
    build_only: bool,
    alias: bool,
    redirect_to: Option<RedirectTarget>,
    arguments: BTreeSet<String>,
    compiled: Option<Compiled>,
}

impl Route {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            endpoint: String::new(),
            defaults: None,
            subdomain: None,
            host: None,
            strict_slashes: None,
            build_only: false,
            alias: false,
            redirect_to: None,
            arguments: BTreeSet::new(),
            compiled: None,
        }
    }

    fn with_arguments_from_defaults(mut self) -> Self {
        self.arguments = self
            .defaults
            .iter()
            .flat_map(|defaults| defaults.keys().cloned())
            .collect();
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_defaults(mut self, defaults: Params) -> Self {
        self.defaults = Some(defaults);
        self.with_arguments_from_defaults()
    }

    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_strict_slashes(mut self, strict_slashes: bool) -> Self {
        self.strict_slashes = Some(strict_slashes);
        self
    }

    pub fn with_build_only(mut self, build_only: bool) -> Self {
        self.build_only = build_only;
        self
    }

    pub fn with_alias(mut self, alias: bool) -> Self {
        self.alias = alias;
        self
    }

    pub fn with_redirect_to(mut self, target: RedirectTarget) -> Self {
        self.redirect_to = Some(target);
        self
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn defaults(&self) -> Option<&Params> {
        self.defaults.as_ref()
    }

    /// Subdomain the route is bound to, or the declared one if unbound.
    pub fn subdomain(&self) -> Option<&str> {
        match &self.compiled {
            Some(compiled) => Some(&compiled.subdomain),
            None => self.subdomain.as_deref(),
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        !self.rule.ends_with('/')
    }

    pub fn build_only(&self) -> bool {
        self.build_only
    }

    pub fn alias(&self) -> bool {
        self.alias
    }

    pub fn redirect_to(&self) -> Option<&RedirectTarget> {
        self.redirect_to.as_ref()
    }

    /// Names of all placeholders and defaults.
    pub fn arguments(&self) -> &BTreeSet<String> {
        &self.arguments
    }

    pub fn is_bound(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn trace(&self) -> Option<&[TracePart]> {
        self.compiled.as_ref().map(|c| c.trace.as_slice())
    }

    pub fn converter(&self, name: &str) -> Option<&Arc<dyn Converter>> {
        self.compiled.as_ref()?.converters.get(name)
    }

    /// An unbound copy with the same options.
    pub fn empty(&self) -> Route {
        Route {
            compiled: None,
            ..self.clone()
        }
        .with_arguments_from_defaults()
    }

    /// Compile against `map`. Binding twice requires `rebind`.
    pub fn bind(&mut self, map: &UrlMap, rebind: bool) -> RoutingResult<()> {
        if self.compiled.is_some() && !rebind {
            return Err(RouteError::AlreadyBound(self.rule.clone()));
        }
        if !self.rule.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(self.rule.clone()));
        }

        let config = map.config();
        let subdomain = self
            .subdomain
            .clone()
            .unwrap_or_else(|| config.default_subdomain.clone());
        let domain_rule = if config.host_matching {
            self.host.clone().unwrap_or_default()
        } else {
            subdomain.clone()
        };

        let mut compiler = Compiler {
            map,
            trace: Vec::new(),
            converters: HashMap::new(),
            weights: Vec::new(),
            regex: String::new(),
            arguments: self
                .defaults
                .iter()
                .flat_map(|defaults| defaults.keys().cloned())
                .collect(),
        };

        compiler.add_rule(&domain_rule)?;
        compiler.regex.push_str(r"\|");
        compiler.trace.push(TracePart {
            dynamic: false,
            data: "|".to_string(),
        });
        let path_rule = if self.is_leaf() {
            self.rule.as_str()
        } else {
            self.rule.trim_end_matches('/')
        };
        compiler.add_rule(path_rule)?;
        if !self.is_leaf() {
            compiler.trace.push(TracePart {
                dynamic: false,
                data: "/".to_string(),
            });
        }

        let strict_slashes = self.strict_slashes.unwrap_or(config.strict_slashes);
        let regex = if self.build_only {
            None
        } else {
            let pattern = format!("^{}$", compiler.regex);
            Some(Regex::new(&pattern).map_err(|source| RouteError::Regex {
                route: self.rule.clone(),
                source,
            })?)
        };

        self.arguments = compiler.arguments;
        self.compiled = Some(Compiled {
            trace: compiler.trace,
            converters: compiler.converters,
            weights: compiler.weights,
            regex,
            optional_slash: !self.is_leaf() || !strict_slashes,
            strict_slashes,
            subdomain,
            settings: BoundSettings {
                redirect_defaults: config.redirect_defaults,
                sort_parameters: config.sort_parameters,
                sort_key: map.sort_key().cloned(),
            },
        });

        tracing::trace!(route = %self.rule, endpoint = %self.endpoint, "route compiled");
        Ok(())
    }

    /// Rebind to `map`, picking up changed options.
    pub fn refresh(&mut self, map: &UrlMap) -> RoutingResult<()> {
        self.bind(map, true)
    }

    /// Match a `"domain|/path"` string.
    ///
    /// Returns `Ok(None)` if the route does not apply. Trailing-slash and
    /// alias redirects are reported through [`MatchSignal`].
    pub fn match_path(&self, path: &str) -> Result<Option<Params>, MatchSignal> {
        let Some(compiled) = &self.compiled else {
            return Ok(None);
        };
        let Some(regex) = &compiled.regex else {
            return Ok(None);
        };

        // A trailing slash counts as the optional suffix only if it does not
        // follow another slash.
        let (caps, has_slash) = match path.strip_suffix('/') {
            Some(stripped) if compiled.optional_slash => {
                if stripped.ends_with('/') {
                    return Ok(None);
                }
                (regex.captures(stripped), true)
            }
            _ => (regex.captures(path), false),
        };
        let Some(caps) = caps else {
            return Ok(None);
        };

        if compiled.strict_slashes && !self.is_leaf() && !has_slash {
            return Err(MatchSignal::RequestSlash);
        }

        let Some(mut result) = self.convert(compiled, &caps) else {
            return Ok(None);
        };
        if let Some(defaults) = &self.defaults {
            result.extend(defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        if self.alias && compiled.settings.redirect_defaults {
            return Err(MatchSignal::AliasRedirect(result));
        }

        Ok(Some(result))
    }

    fn convert(&self, compiled: &Compiled, caps: &Captures<'_>) -> Option<Params> {
        let mut result = Params::new();
        for part in compiled.trace.iter().filter(|part| part.dynamic) {
            let raw = caps.name(&part.data).map_or("", |m| m.as_str());
            let converter = compiled.converters.get(&part.data)?;
            match converter.to_value(raw) {
                Ok(value) => {
                    result.insert(part.data.clone(), value);
                }
                Err(_) => {
                    tracing::trace!(
                        route = %self.rule,
                        variable = %part.data,
                        value = raw,
                        "converter rejected segment"
                    );
                    return None;
                }
            }
        }
        Some(result)
    }

    /// Build `(domain_part, path)` from `values`.
    ///
    /// Returns `None` if a value is missing or a converter rejects it. With
    /// `append_unknown`, values that are not arguments become the query string.
    pub fn build(&self, values: &Params, append_unknown: bool) -> Option<(String, String)> {
        let compiled = self.compiled.as_ref()?;

        let mut url = String::new();
        for part in &compiled.trace {
            if part.dynamic {
                let value = values
                    .get(&part.data)
                    .or_else(|| self.defaults.as_ref()?.get(&part.data))?;
                let converter = compiled.converters.get(&part.data)?;
                url.push_str(&converter.to_url(value).ok()?);
            } else {
                url.push_str(&quote(&part.data, PATH_SAFE));
            }
        }

        let (domain_part, path) = url.split_once('|')?;
        let mut path = path.to_string();

        if append_unknown {
            let unknown: Vec<(String, Value)> = values
                .iter()
                .filter(|(key, _)| !self.arguments.contains(*key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            if !unknown.is_empty() {
                path.push('?');
                path.push_str(&url_encode(
                    unknown,
                    compiled.settings.sort_parameters,
                    compiled.settings.sort_key.as_ref(),
                ));
            }
        }

        Some((domain_part.to_string(), path))
    }

    /// Whether this route supplies defaults that make `other` redundant.
    pub fn provides_defaults_for(&self, other: &Route) -> bool {
        !self.build_only
            && self.defaults.as_ref().is_some_and(|d| !d.is_empty())
            && self.endpoint == other.endpoint
            && self != other
            && self.arguments == other.arguments
    }

    /// Whether `values` are enough to build this route.
    ///
    /// Every argument must come from `values` or the defaults, and values
    /// given for defaulted arguments must equal the default.
    pub fn suitable_for(&self, values: &Params) -> bool {
        let defaults = self.defaults.as_ref();

        let all_present = self.arguments.iter().all(|key| {
            values.contains_key(key) || defaults.is_some_and(|d| d.contains_key(key))
        });
        if !all_present {
            return false;
        }

        defaults.map_or(true, |defaults| {
            defaults
                .iter()
                .all(|(key, default)| values.get(key).map_or(true, |value| value == default))
        })
    }

    pub fn match_compare_key(&self) -> MatchKey {
        let weights = self
            .compiled
            .as_ref()
            .map(|c| c.weights.clone())
            .unwrap_or_default();
        (!self.arguments.is_empty(), -(weights.len() as isize), weights)
    }

    pub fn build_compare_key(&self) -> BuildKey {
        (
            u8::from(self.alias),
            -(self.arguments.len() as isize),
            -(self.defaults.as_ref().map_or(0, |d| d.len()) as isize),
        )
    }

    /// Template with placeholders reduced to `<name>`, domain part dropped.
    fn display_trace(&self) -> Option<String> {
        let trace = self.trace()?;
        let joined: String = trace
            .iter()
            .map(|part| {
                if part.dynamic {
                    format!("<{}>", part.data)
                } else {
                    part.data.clone()
                }
            })
            .collect();
        Some(joined.trim_start_matches('|').to_string())
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.trace() == other.trace()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rule)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_trace() {
            Some(trace) => write!(f, "<Route '{}' -> {}>", trace, self.endpoint),
            None => f.write_str("<Route (unbound)>"),
        }
    }
}

struct Compiler<'m> {
    map: &'m UrlMap,
    trace: Vec<TracePart>,
    converters: HashMap<String, Arc<dyn Converter>>,
    weights: Vec<(u8, i64)>,
    regex: String,
    arguments: BTreeSet<String>,
}

impl Compiler<'_> {
    fn add_rule(&mut self, rule: &str) -> RoutingResult<()> {
        for part in parse_route(rule)? {
            match part {
                RoutePart::Static(text) => {
                    self.regex.push_str(&regex::escape(&text));
                    for segment in text.split('/').filter(|s| !s.is_empty()) {
                        self.weights.push((0, -(segment.chars().count() as i64)));
                    }
                    self.trace.push(TracePart {
                        dynamic: false,
                        data: text,
                    });
                }
                RoutePart::Variable {
                    converter,
                    args,
                    name,
                } => {
                    let args = args
                        .as_deref()
                        .map(parse_converter_args)
                        .unwrap_or_else(ConverterArgs::default);
                    let factory = self
                        .map
                        .converters()
                        .get(&converter)
                        .ok_or_else(|| RouteError::UnknownConverter(converter.clone()))?;
                    let instance = factory(&args)?;

                    self.regex
                        .push_str(&format!("(?P<{}>{})", name, instance.regex()));
                    self.weights.push((1, i64::from(instance.weight())));
                    self.converters.insert(name.clone(), instance);
                    self.arguments.insert(name.clone());
                    self.trace.push(TracePart {
                        dynamic: true,
                        data: name,
                    });
                }
            }
        }
        Ok(())
    }
}
