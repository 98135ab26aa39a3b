//! Routing and content negotiation toolkit

pub mod accept;
pub mod config;
pub mod dispatch;
pub mod observability;
pub mod routing;

pub use accept::{select_representation, Representation, RequestAccept};
pub use config::AppConfig;
pub use dispatch::{Binding, Dispatcher, ExceptionDispatcher};
pub use routing::{MapAdapter, Route, UrlMap};
