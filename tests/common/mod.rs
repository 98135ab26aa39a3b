//! Shared utilities for integration tests.

use std::fs;
use std::path::PathBuf;

use verktyg::accept::RequestAccept;
use verktyg::config::MapConfig;
use verktyg::routing::{Route, UrlMap};

/// Map with default options holding `routes`.
#[allow(dead_code)]
pub fn map(routes: Vec<Route>) -> UrlMap {
    map_with(MapConfig::default(), routes)
}

/// Map with custom options holding `routes`.
#[allow(dead_code)]
pub fn map_with(config: MapConfig, routes: Vec<Route>) -> UrlMap {
    UrlMap::with_routes(config, routes).unwrap()
}

/// Shorthand for a route with an endpoint.
#[allow(dead_code)]
pub fn route(rule: &str, endpoint: &str) -> Route {
    Route::new(rule).with_endpoint(endpoint)
}

/// Accept headers of a request. `None` accepts anything.
#[allow(dead_code)]
pub fn request(
    accept: Option<&str>,
    accept_language: Option<&str>,
    accept_charset: Option<&str>,
) -> RequestAccept {
    RequestAccept::from_headers(accept, accept_language, accept_charset).unwrap()
}

/// Write `contents` to a fresh file in the temp directory.
#[allow(dead_code)]
pub fn write_config(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("verktyg-{}.toml", uuid::Uuid::new_v4()));
    fs::write(&path, contents).unwrap();
    path
}
