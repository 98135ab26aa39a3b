//! Dispatch errors.

use http::{Method, StatusCode};
use thiserror::Error;

use crate::accept::NotAcceptable;

/// Why a dispatcher could not pick a binding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// No binding was ever registered under this name.
    #[error("no bindings for {name:?}")]
    NotImplemented { name: String },

    /// The name exists but not with the requested method.
    #[error("method not allowed, expected one of {}", join_methods(.allowed))]
    MethodNotAllowed { allowed: Vec<Method> },

    /// Bindings exist for the method but none satisfy the Accept headers.
    #[error(transparent)]
    NotAcceptable(#[from] NotAcceptable),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            DispatchError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
        }
    }

    /// Value for the `Allow` response header, if this is a 405.
    pub fn allow_header(&self) -> Option<String> {
        match self {
            DispatchError::MethodNotAllowed { allowed } => Some(join_methods(allowed)),
            _ => None,
        }
    }
}

fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
