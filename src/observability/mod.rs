//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! accept / dispatch / routing:
//!     → tracing macros (structured events, fields per decision)
//!     → metrics.rs (outcome counters through the metrics facade)
//!
//! Binary:
//!     → logging.rs (installs the subscriber once at startup)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; installing subscribers and recorders is left to the binary
//! - Counters are no-ops until a recorder is installed
//! - Log level from config, overridden by `RUST_LOG`

pub mod logging;
pub mod metrics;
