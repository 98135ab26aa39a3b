//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint name (from routing) + HTTP method + RequestAccept
//!     → dispatcher.rs (name → method → candidate bindings)
//!     → HEAD with no bindings of its own uses GET's
//!     → accept::select_representation (best candidate, last wins ties)
//!     → Binding, or DispatchError (501 / 405 / 406)
//!
//! Error kind + RequestAccept
//!     → exception.rs (walk ancestry, most derived first)
//!     → first kind with an acceptable handler, or None
//! ```
//!
//! # Design Decisions
//! - Actions are generic; the dispatcher never calls them
//! - Registration order is preserved everywhere, so later bindings override
//!   earlier ones of equal quality
//! - Dispatchers are binding factories themselves and nest by merging

pub mod binding;
pub mod dispatcher;
pub mod error;
pub mod exception;

pub use binding::{Binding, BindingFactory};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use exception::{
    ExceptionClass, ExceptionDispatcher, ExceptionHandler, ExceptionHandlerFactory, ExceptionKind,
};
