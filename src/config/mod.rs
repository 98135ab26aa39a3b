//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → build_map() → UrlMap (routes bound in declaration order)
//!     → build_dispatcher() → Dispatcher<String> (actions by name)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_str, ConfigError};
pub use schema::{AppConfig, BindingConfig, MapConfig, ObservabilityConfig, RouteConfig};

use crate::accept::{HeaderError, Representation};
use crate::dispatch::{Binding, Dispatcher};
use crate::routing::{Route, UrlMap};

impl AppConfig {
    /// Compile the configured routes into a map.
    pub fn build_map(&self) -> Result<UrlMap, ConfigError> {
        let routes: Vec<Route> = self.routes.iter().map(RouteConfig::to_route).collect();
        Ok(UrlMap::with_routes(self.map.clone(), routes)?)
    }

    /// Index the configured bindings. Actions are the configured names.
    pub fn build_dispatcher(&self) -> Result<Dispatcher<String>, ConfigError> {
        let mut dispatcher = Dispatcher::new();
        for binding in &self.bindings {
            dispatcher.add(binding.to_binding()?);
        }
        Ok(dispatcher)
    }
}

impl BindingConfig {
    pub fn to_binding(&self) -> Result<Binding<String>, ConfigError> {
        let invalid = |source: HeaderError| ConfigError::Binding {
            endpoint: self.endpoint.clone(),
            source,
        };

        let method = self.http_method().map_err(|_| {
            invalid(HeaderError::InvalidValue {
                header: "method",
                value: self.method.clone(),
            })
        })?;
        let representation = Representation::parse(
            self.content_type.as_deref(),
            self.language.as_deref(),
            self.charset.as_deref(),
            self.qs,
        )
        .map_err(invalid)?;

        Ok(Binding::new(self.endpoint.clone(), self.action.clone())
            .with_method(method)
            .with_representation(representation))
    }
}
