//! URL quoting helpers shared by converters, routes and the adapter.

use std::cmp::Ordering;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::routing::value::Value;

/// Characters never escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Escape set for converted values: slashes and colons pass through.
pub const VALUE_SAFE: &AsciiSet = &UNRESERVED.remove(b'/').remove(b':');

/// Escape set for static route text and redirect paths.
pub const PATH_SAFE: &AsciiSet = &VALUE_SAFE.remove(b'|').remove(b'+');

/// Percent-encode `value` as UTF-8, leaving `safe` characters as they are.
pub fn quote(value: &str, safe: &'static AsciiSet) -> String {
    utf8_percent_encode(value, safe).to_string()
}

/// Comparator used to order query parameters when building.
pub type SortKey = Arc<dyn Fn(&(String, Value), &(String, Value)) -> Ordering + Send + Sync>;

/// Encode `pairs` as `application/x-www-form-urlencoded`.
pub fn url_encode(mut pairs: Vec<(String, Value)>, sort: bool, key: Option<&SortKey>) -> String {
    if sort {
        match key {
            Some(key) => pairs.sort_by(|a, b| key(a, b)),
            None => pairs.sort_by(|a, b| a.0.cmp(&b.0)),
        }
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in &pairs {
        serializer.append_pair(name, &value.to_string());
    }
    serializer.finish()
}
