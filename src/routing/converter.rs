//! Placeholder converters.
//!
//! # Responsibilities
//! - Supply the regex fragment a placeholder matches
//! - Convert matched text into typed values and back into URL text
//! - Rank placeholders through a weight (lower sorts first)
//!
//! # Built-ins
//! - `default` / `string`: one path segment, optional length bounds
//! - `any`: one of a fixed set of items
//! - `path`: like `string` but slashes allowed
//! - `int` / `float`: non-negative numbers with optional bounds
//! - `uuid`: canonical hyphenated UUIDs

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::routing::encoding::{quote, VALUE_SAFE};
use crate::routing::error::{RouteError, RoutingResult, ValidationError};
use crate::routing::parser::{ConverterArg, ConverterArgs};
use crate::routing::value::Value;

/// Converts between a URL segment and a typed [`Value`].
pub trait Converter: fmt::Debug + Send + Sync {
    /// Regex fragment for the placeholder, without groups of its own.
    fn regex(&self) -> &str;

    /// Ordering weight. More specific converters use smaller weights.
    fn weight(&self) -> u32 {
        100
    }

    /// Convert matched text. An error means the route does not match.
    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        Ok(Value::Str(raw.to_string()))
    }

    /// Convert a value into URL text. An error means the route cannot build.
    fn to_url(&self, value: &Value) -> Result<String, ValidationError> {
        Ok(quote(&value.to_string(), VALUE_SAFE))
    }
}

/// Creates a converter from the arguments in a placeholder.
pub type ConverterFactory =
    Arc<dyn Fn(&ConverterArgs) -> RoutingResult<Arc<dyn Converter>> + Send + Sync>;

/// Converter registry keyed by the name used in templates.
pub type ConverterRegistry = IndexMap<String, ConverterFactory>;

fn invalid(converter: &str, reason: impl Into<String>) -> RouteError {
    RouteError::InvalidConverterArguments {
        converter: converter.to_string(),
        reason: reason.into(),
    }
}

fn optional_int(converter: &str, arg: Option<&ConverterArg>) -> RoutingResult<Option<i64>> {
    match arg {
        None | Some(ConverterArg::None) => Ok(None),
        Some(arg) => arg
            .as_int()
            .map(Some)
            .ok_or_else(|| invalid(converter, format!("expected an integer, got {arg}"))),
    }
}

fn optional_float(converter: &str, arg: Option<&ConverterArg>) -> RoutingResult<Option<f64>> {
    match arg {
        None | Some(ConverterArg::None) => Ok(None),
        Some(arg) => arg
            .as_float()
            .map(Some)
            .ok_or_else(|| invalid(converter, format!("expected a number, got {arg}"))),
    }
}

/// One path segment of bounded length.
#[derive(Debug, Clone)]
pub struct StringConverter {
    regex: String,
}

impl StringConverter {
    pub fn new(minlength: usize, maxlength: Option<usize>, length: Option<usize>) -> Self {
        let quantifier = match (length, maxlength) {
            (Some(length), _) => format!("{{{length}}}"),
            (None, Some(maxlength)) => format!("{{{minlength},{maxlength}}}"),
            (None, None) => format!("{{{minlength},}}"),
        };
        Self {
            regex: format!("[^/]{quantifier}"),
        }
    }

    pub fn from_args(args: &ConverterArgs) -> RoutingResult<Self> {
        let bound = args.bind("string", &["minlength", "maxlength", "length"])?;
        let to_usize = |name: &str| -> RoutingResult<Option<usize>> {
            optional_int("string", bound.get(name))?
                .map(|v| {
                    usize::try_from(v)
                        .map_err(|_| invalid("string", format!("{name} must not be negative")))
                })
                .transpose()
        };

        Ok(Self::new(
            to_usize("minlength")?.unwrap_or(1),
            to_usize("maxlength")?,
            to_usize("length")?,
        ))
    }
}

impl Default for StringConverter {
    fn default() -> Self {
        Self::new(1, None, None)
    }
}

impl Converter for StringConverter {
    fn regex(&self) -> &str {
        &self.regex
    }
}

/// Matches exactly one of a fixed set of items.
#[derive(Debug, Clone)]
pub struct AnyConverter {
    items: Vec<String>,
    regex: String,
}

impl AnyConverter {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        let alternatives: Vec<String> = items.iter().map(|item| regex::escape(item)).collect();
        Self {
            regex: format!("(?:{})", alternatives.join("|")),
            items,
        }
    }

    pub fn from_args(args: &ConverterArgs) -> RoutingResult<Self> {
        if !args.keyword.is_empty() {
            return Err(invalid("any", "takes positional items only"));
        }
        if args.positional.is_empty() {
            return Err(invalid("any", "needs at least one item"));
        }
        Ok(Self::new(args.positional.iter().map(ToString::to_string)))
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl Converter for AnyConverter {
    fn regex(&self) -> &str {
        &self.regex
    }
}

/// Like [`StringConverter`] but also matches slashes.
#[derive(Debug, Clone, Default)]
pub struct PathConverter;

impl Converter for PathConverter {
    fn regex(&self) -> &str {
        "[^/].*?"
    }

    fn weight(&self) -> u32 {
        200
    }
}

/// Non-negative integers.
#[derive(Debug, Clone, Default)]
pub struct IntegerConverter {
    fixed_digits: usize,
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerConverter {
    pub fn new(fixed_digits: usize, min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            fixed_digits,
            min,
            max,
        }
    }

    pub fn from_args(args: &ConverterArgs) -> RoutingResult<Self> {
        let bound = args.bind("int", &["fixed_digits", "min", "max"])?;
        let fixed_digits = optional_int("int", bound.get("fixed_digits"))?.unwrap_or(0);
        let fixed_digits = usize::try_from(fixed_digits)
            .map_err(|_| invalid("int", "fixed_digits must not be negative"))?;

        Ok(Self::new(
            fixed_digits,
            optional_int("int", bound.get("min"))?,
            optional_int("int", bound.get("max"))?,
        ))
    }

    fn coerce(value: &Value) -> Result<i64, ValidationError> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            Value::Str(s) => s.trim().parse().map_err(|_| ValidationError),
            _ => Err(ValidationError),
        }
    }
}

impl Converter for IntegerConverter {
    fn regex(&self) -> &str {
        r"\d+"
    }

    fn weight(&self) -> u32 {
        50
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        if self.fixed_digits > 0 && raw.len() != self.fixed_digits {
            return Err(ValidationError);
        }
        let value: i64 = raw.parse().map_err(|_| ValidationError)?;
        if self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max) {
            return Err(ValidationError);
        }
        Ok(Value::Int(value))
    }

    fn to_url(&self, value: &Value) -> Result<String, ValidationError> {
        let value = Self::coerce(value)?;
        if self.fixed_digits > 0 {
            Ok(format!("{value:0width$}", width = self.fixed_digits))
        } else {
            Ok(value.to_string())
        }
    }
}

/// Non-negative decimal numbers with a fractional part.
#[derive(Debug, Clone, Default)]
pub struct FloatConverter {
    min: Option<f64>,
    max: Option<f64>,
}

impl FloatConverter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn from_args(args: &ConverterArgs) -> RoutingResult<Self> {
        let bound = args.bind("float", &["min", "max"])?;
        Ok(Self::new(
            optional_float("float", bound.get("min"))?,
            optional_float("float", bound.get("max"))?,
        ))
    }
}

impl Converter for FloatConverter {
    fn regex(&self) -> &str {
        r"\d+\.\d+"
    }

    fn weight(&self) -> u32 {
        50
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        let value: f64 = raw.parse().map_err(|_| ValidationError)?;
        if self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max) {
            return Err(ValidationError);
        }
        Ok(Value::Float(value))
    }

    fn to_url(&self, value: &Value) -> Result<String, ValidationError> {
        let value = match value {
            Value::Str(s) => s.trim().parse::<f64>().map_err(|_| ValidationError)?,
            other => other.as_float().ok_or(ValidationError)?,
        };
        Ok(format!("{value:?}"))
    }
}

/// Canonical hyphenated UUIDs.
#[derive(Debug, Clone, Default)]
pub struct UuidConverter;

impl Converter for UuidConverter {
    fn regex(&self) -> &str {
        "[A-Fa-f0-9]{8}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{12}"
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        Uuid::parse_str(raw)
            .map(Value::Uuid)
            .map_err(|_| ValidationError)
    }

    fn to_url(&self, value: &Value) -> Result<String, ValidationError> {
        let uuid = match value {
            Value::Uuid(u) => *u,
            Value::Str(s) => Uuid::parse_str(s).map_err(|_| ValidationError)?,
            _ => return Err(ValidationError),
        };
        Ok(uuid.hyphenated().to_string())
    }
}

fn no_args<C>(name: &'static str, converter: C) -> ConverterFactory
where
    C: Converter + Clone + 'static,
{
    Arc::new(move |args: &ConverterArgs| {
        if !args.is_empty() {
            return Err(invalid(name, "takes no arguments"));
        }
        Ok(Arc::new(converter.clone()) as Arc<dyn Converter>)
    })
}

/// Wrap a fallible constructor as a registry entry.
pub fn factory<C, F>(build: F) -> ConverterFactory
where
    C: Converter + 'static,
    F: Fn(&ConverterArgs) -> RoutingResult<C> + Send + Sync + 'static,
{
    Arc::new(move |args: &ConverterArgs| Ok(Arc::new(build(args)?) as Arc<dyn Converter>))
}

/// The converters every map starts with.
pub fn default_converters() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    registry.insert("default".to_string(), factory(StringConverter::from_args));
    registry.insert("string".to_string(), factory(StringConverter::from_args));
    registry.insert("any".to_string(), factory(AnyConverter::from_args));
    registry.insert("path".to_string(), no_args("path", PathConverter));
    registry.insert("int".to_string(), factory(IntegerConverter::from_args));
    registry.insert("float".to_string(), factory(FloatConverter::from_args));
    registry.insert("uuid".to_string(), no_args("uuid", UuidConverter));
    registry
}
