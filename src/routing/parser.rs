//! Route template and converter argument parsing.
//!
//! # Responsibilities
//! - Split `/page/<int(min=1):id>` into static and placeholder parts
//! - Parse converter argument lists (`"test, a=1, b=3.0"`) into typed values
//! - Bind parsed arguments to a converter's parameter names

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::routing::error::{RouteError, RoutingResult};

static ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<static>[^<]*)<(?:(?P<converter>[a-zA-Z_][a-zA-Z0-9_]*)(?:\((?P<args>.*?)\))?:)?(?P<variable>[a-zA-Z_][a-zA-Z0-9_]*)>",
    )
    .expect("valid route grammar")
});

static CONVERTER_ARGS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"((?P<name>\w+)\s*=\s*)?(?P<value>True|False|\d+\.\d+|\d+\.|\d+|\w+|[urUR]?(?P<stringval>"[^"]*?"|'[^']*'))\s*,"#,
    )
    .expect("valid converter argument grammar")
});

/// One piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePart {
    Static(String),
    Variable {
        converter: String,
        args: Option<String>,
        name: String,
    },
}

/// Parse a route template into static text and placeholders.
pub fn parse_route(route: &str) -> RoutingResult<Vec<RoutePart>> {
    let mut parts = Vec::new();
    let mut used_names = HashSet::new();
    let mut pos = 0;

    while pos < route.len() {
        let Some(caps) = ROUTE_RE.captures(&route[pos..]) else {
            break;
        };

        let static_part = caps.name("static").map_or("", |m| m.as_str());
        if !static_part.is_empty() {
            parts.push(RoutePart::Static(static_part.to_string()));
        }

        let name = caps.name("variable").map_or("", |m| m.as_str()).to_string();
        if !used_names.insert(name.clone()) {
            return Err(RouteError::DuplicateVariable(name));
        }

        parts.push(RoutePart::Variable {
            converter: caps
                .name("converter")
                .map_or("default", |m| m.as_str())
                .to_string(),
            args: caps
                .name("args")
                .map(|m| m.as_str().to_string())
                .filter(|args| !args.is_empty()),
            name,
        });

        pos += caps.get(0).map_or(0, |m| m.end());
    }

    if pos < route.len() {
        let remaining = &route[pos..];
        if remaining.contains('<') || remaining.contains('>') {
            return Err(RouteError::Malformed(route.to_string()));
        }
        parts.push(RoutePart::Static(remaining.to_string()));
    }

    Ok(parts)
}

/// A literal in a converter argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum ConverterArg {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConverterArg {
    fn from_literal(value: &str) -> Self {
        match value {
            "None" => return ConverterArg::None,
            "True" => return ConverterArg::Bool(true),
            "False" => return ConverterArg::Bool(false),
            _ => {}
        }
        if let Ok(i) = value.parse::<i64>() {
            return ConverterArg::Int(i);
        }
        if let Ok(f) = value.parse::<f64>() {
            return ConverterArg::Float(f);
        }

        let quoted = value.len() >= 2
            && (value.starts_with('"') || value.starts_with('\''))
            && value.ends_with(&value[..1]);
        if quoted {
            ConverterArg::Str(value[1..value.len() - 1].to_string())
        } else {
            ConverterArg::Str(value.to_string())
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConverterArg::Int(i) => Some(*i),
            ConverterArg::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConverterArg::Int(i) => Some(*i as f64),
            ConverterArg::Float(f) => Some(*f),
            ConverterArg::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ConverterArg::None)
    }
}

impl fmt::Display for ConverterArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConverterArg::None => f.write_str("None"),
            ConverterArg::Bool(true) => f.write_str("True"),
            ConverterArg::Bool(false) => f.write_str("False"),
            ConverterArg::Int(i) => write!(f, "{i}"),
            ConverterArg::Float(x) => write!(f, "{x:?}"),
            ConverterArg::Str(s) => f.write_str(s),
        }
    }
}

/// Positional and keyword arguments of a converter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverterArgs {
    pub positional: Vec<ConverterArg>,
    pub keyword: IndexMap<String, ConverterArg>,
}

impl ConverterArgs {
    /// Assign arguments to named parameters like a call would.
    ///
    /// Positional arguments fill `names` in order, keyword arguments by name.
    /// Unknown names, surplus positional arguments and duplicates are errors.
    pub fn bind(
        &self,
        converter: &str,
        names: &[&str],
    ) -> RoutingResult<IndexMap<String, ConverterArg>> {
        let invalid = |reason: String| RouteError::InvalidConverterArguments {
            converter: converter.to_string(),
            reason,
        };

        if self.positional.len() > names.len() {
            return Err(invalid(format!(
                "takes at most {} positional arguments but {} were given",
                names.len(),
                self.positional.len()
            )));
        }

        let mut bound: IndexMap<String, ConverterArg> = names
            .iter()
            .zip(&self.positional)
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        for (name, value) in &self.keyword {
            if !names.contains(&name.as_str()) {
                return Err(invalid(format!("unexpected keyword argument {name:?}")));
            }
            if bound.insert(name.clone(), value.clone()).is_some() {
                return Err(invalid(format!("multiple values for argument {name:?}")));
            }
        }

        Ok(bound)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// Parse a converter argument list.
///
/// ```text
/// test, a=1, b=3.0   → positional ["test"], keyword {a: 1, b: 3.0}
/// "foo", u"bar"      → positional ["foo", "bar"]
/// ```
pub fn parse_converter_args(argstr: &str) -> ConverterArgs {
    let input = format!("{argstr},");
    let mut args = ConverterArgs::default();

    for caps in CONVERTER_ARGS_RE.captures_iter(&input) {
        let literal = caps
            .name("stringval")
            .or_else(|| caps.name("value"))
            .map_or("", |m| m.as_str());
        let value = ConverterArg::from_literal(literal);

        match caps.name("name") {
            Some(name) => {
                args.keyword.insert(name.as_str().to_string(), value);
            }
            None => args.positional.push(value),
        }
    }

    args
}
