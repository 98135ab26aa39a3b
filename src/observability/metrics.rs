//! Metrics collection.
//!
//! # Metrics
//! - `verktyg_route_matches_total` (counter): path matches by outcome
//!   (`matched`, `redirect`, `not_found`)
//! - `verktyg_url_builds_total` (counter): URL builds by outcome (`built`, `failed`)
//! - `verktyg_negotiations_total` (counter): dispatch and selection outcomes
//!   (`selected`, `not_acceptable`, `method_not_allowed`, `not_implemented`)
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding application picks the exporter
//! - Only outcome labels, never paths or endpoints, to keep cardinality bounded

pub const ROUTE_MATCHES: &str = "verktyg_route_matches_total";
pub const URL_BUILDS: &str = "verktyg_url_builds_total";
pub const NEGOTIATIONS: &str = "verktyg_negotiations_total";

pub fn record_route_match(outcome: &'static str) {
    ::metrics::counter!(ROUTE_MATCHES, "outcome" => outcome).increment(1);
}

pub fn record_url_build(outcome: &'static str) {
    ::metrics::counter!(URL_BUILDS, "outcome" => outcome).increment(1);
}

pub fn record_negotiation(outcome: &'static str) {
    ::metrics::counter!(NEGOTIATIONS, "outcome" => outcome).increment(1);
}
