//! Exception dispatch: pick an error renderer by error kind and Accept headers.
//!
//! Handlers are registered per kind name. Lookup walks the kind's ancestry
//! from most to least derived and returns the first handler whose
//! representation the request accepts.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use indexmap::IndexMap;
use tracing::debug;

use crate::accept::{select_representation, HasRepresentation, Representation, RequestAccept};

/// An error type with a chain of ancestor kinds.
pub trait ExceptionKind {
    /// Kind names from most to least derived, starting with this kind.
    fn ancestry(&self) -> Vec<&str>;
}

/// A named kind with an optional parent, for declaring hierarchies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionClass {
    name: String,
    parent: Option<Arc<ExceptionClass>>,
}

impl ExceptionClass {
    pub fn root(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: None,
        })
    }

    pub fn subclass(self: &Arc<Self>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: Some(Arc::clone(self)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ExceptionKind for ExceptionClass {
    fn ancestry(&self) -> Vec<&str> {
        let mut chain = vec![self.name.as_str()];
        let mut current = self.parent.as_deref();
        while let Some(class) = current {
            chain.push(class.name.as_str());
            current = class.parent.as_deref();
        }
        chain
    }
}

/// HTTP errors: the status code, then its class, then `HTTPException`.
impl ExceptionKind for StatusCode {
    fn ancestry(&self) -> Vec<&str> {
        let class = if self.is_client_error() {
            "ClientError"
        } else if self.is_server_error() {
            "ServerError"
        } else {
            "HTTPStatus"
        };
        vec![self.as_str(), class, "HTTPException"]
    }
}

/// An action rendering one kind of error in one representation.
#[derive(Clone, PartialEq)]
pub struct ExceptionHandler<A> {
    kind: String,
    action: A,
    representation: Representation,
}

impl<A> ExceptionHandler<A> {
    pub fn new(kind: impl Into<String>, action: A) -> Self {
        Self {
            kind: kind.into(),
            action,
            representation: Representation::default(),
        }
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn action(&self) -> &A {
        &self.action
    }
}

impl<A> HasRepresentation for ExceptionHandler<A> {
    fn representation(&self) -> &Representation {
        &self.representation
    }
}

impl<A> fmt::Debug for ExceptionHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ExceptionHandler {:?}", self.kind)?;
        if let Some(content_type) = self.representation.content_type() {
            write!(f, " {content_type}")?;
        }
        f.write_str(">")
    }
}

/// Source of exception handlers. Dispatchers nest through this.
pub trait ExceptionHandlerFactory<A> {
    fn get_exception_handlers(&self) -> Vec<ExceptionHandler<A>>;
}

impl<A: Clone> ExceptionHandlerFactory<A> for ExceptionHandler<A> {
    fn get_exception_handlers(&self) -> Vec<ExceptionHandler<A>> {
        vec![self.clone()]
    }
}

impl<A, F: ExceptionHandlerFactory<A>> ExceptionHandlerFactory<A> for Vec<F> {
    fn get_exception_handlers(&self) -> Vec<ExceptionHandler<A>> {
        self.iter()
            .flat_map(|factory| factory.get_exception_handlers())
            .collect()
    }
}

/// Exception handlers grouped by kind name.
pub struct ExceptionDispatcher<A> {
    handlers: IndexMap<String, Vec<ExceptionHandler<A>>>,
}

impl<A> ExceptionDispatcher<A> {
    pub fn new() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    pub fn from_handlers(handlers: impl IntoIterator<Item = ExceptionHandler<A>>) -> Self {
        let mut dispatcher = Self::new();
        for handler in handlers {
            dispatcher.add(handler);
        }
        dispatcher
    }

    pub fn add(&mut self, handler: ExceptionHandler<A>) {
        self.handlers
            .entry(handler.kind.clone())
            .or_default()
            .push(handler);
    }

    pub fn add_exception_handlers(&mut self, factory: &impl ExceptionHandlerFactory<A>) {
        for handler in factory.get_exception_handlers() {
            self.add(handler);
        }
    }

    /// Action of the best handler for `exception`.
    ///
    /// Kinds with no acceptable handler are skipped in favour of their
    /// ancestors. `None` means nothing in the chain fits and the error
    /// should propagate.
    pub fn lookup(&self, exception: &dyn ExceptionKind, request: &RequestAccept) -> Option<&A> {
        for kind in exception.ancestry() {
            let Some(handlers) = self.handlers.get(kind) else {
                continue;
            };
            match select_representation(handlers, request) {
                Ok(handler) => {
                    debug!(kind, "exception handler selected");
                    return Some(&handler.action);
                }
                Err(_) => continue,
            }
        }
        None
    }
}

impl<A> Default for ExceptionDispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone> ExceptionHandlerFactory<A> for ExceptionDispatcher<A> {
    fn get_exception_handlers(&self) -> Vec<ExceptionHandler<A>> {
        self.handlers.values().flatten().cloned().collect()
    }
}

impl<A> fmt::Debug for ExceptionDispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.handlers.iter()).finish()
    }
}
