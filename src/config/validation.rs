//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that route templates parse and bindings name valid methods
//! - Validate value ranges (qs within [0, 1])
//! - Warn about bindings whose endpoint no route produces
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::accept::{Charset, ContentType, Language};
use crate::config::schema::AppConfig;
use crate::routing::parser::parse_route;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Location of the offending value, e.g. `routes[2].path`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check everything serde cannot.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}", config.observability.log_level),
        ));
    }

    for (i, route) in config.routes.iter().enumerate() {
        let field = |name: &str| format!("routes[{i}].{name}");

        if !route.path.starts_with('/') {
            errors.push(ValidationError::new(field("path"), "must start with '/'"));
        }
        if let Err(err) = parse_route(&route.path) {
            errors.push(ValidationError::new(field("path"), err.to_string()));
        }
        if route.endpoint.is_empty() {
            errors.push(ValidationError::new(field("endpoint"), "must not be empty"));
        }
        if let Some(subdomain) = &route.subdomain {
            if config.map.host_matching {
                errors.push(ValidationError::new(
                    field("subdomain"),
                    "ignored while host matching is enabled",
                ));
            }
            if let Err(err) = parse_route(subdomain) {
                errors.push(ValidationError::new(field("subdomain"), err.to_string()));
            }
        }
        if let Some(host) = &route.host {
            if let Err(err) = parse_route(host) {
                errors.push(ValidationError::new(field("host"), err.to_string()));
            }
        }
    }

    let endpoints: HashSet<&str> = config.routes.iter().map(|r| r.endpoint.as_str()).collect();

    for (i, binding) in config.bindings.iter().enumerate() {
        let field = |name: &str| format!("bindings[{i}].{name}");

        if binding.http_method().is_err() {
            errors.push(ValidationError::new(
                field("method"),
                format!("invalid method {:?}", binding.method),
            ));
        }
        if binding.action.is_empty() {
            errors.push(ValidationError::new(field("action"), "must not be empty"));
        }
        if let Some(content_type) = &binding.content_type {
            if let Err(err) = ContentType::parse(content_type) {
                errors.push(ValidationError::new(field("content_type"), err.to_string()));
            }
        }
        if let Some(language) = &binding.language {
            if let Err(err) = Language::parse(language) {
                errors.push(ValidationError::new(field("language"), err.to_string()));
            }
        }
        if let Some(charset) = &binding.charset {
            if let Err(err) = Charset::parse(charset) {
                errors.push(ValidationError::new(field("charset"), err.to_string()));
            }
        }
        if let Some(qs) = binding.qs {
            if !(0.0..=1.0).contains(&qs) {
                errors.push(ValidationError::new(
                    field("qs"),
                    format!("{qs} is outside [0, 1]"),
                ));
            }
        }

        if !endpoints.contains(binding.endpoint.as_str()) {
            warn!(
                endpoint = %binding.endpoint,
                "binding refers to an endpoint no route produces"
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
