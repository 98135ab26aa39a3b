//! Bindings: an action for one endpoint name, method and representation.

use std::fmt;

use http::Method;

use crate::accept::{HasRepresentation, Representation};

/// An action registered under a name and method, offering one representation.
#[derive(Clone, PartialEq)]
pub struct Binding<A> {
    name: String,
    method: Method,
    action: A,
    representation: Representation,
}

impl<A> Binding<A> {
    /// A `GET` binding with the default representation.
    pub fn new(name: impl Into<String>, action: A) -> Self {
        Self {
            name: name.into(),
            method: Method::GET,
            action,
            representation: Representation::default(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn action(&self) -> &A {
        &self.action
    }
}

impl<A> HasRepresentation for Binding<A> {
    fn representation(&self) -> &Representation {
        &self.representation
    }
}

impl<A> fmt::Debug for Binding<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Binding {:?} {}", self.name, self.method)?;
        if let Some(content_type) = self.representation.content_type() {
            write!(f, " {content_type}")?;
        }
        f.write_str(">")
    }
}

/// Source of bindings. Dispatchers are factories too, so they nest.
pub trait BindingFactory<A> {
    fn get_bindings(&self) -> Vec<Binding<A>>;
}

impl<A: Clone> BindingFactory<A> for Binding<A> {
    fn get_bindings(&self) -> Vec<Binding<A>> {
        vec![self.clone()]
    }
}

impl<A, F: BindingFactory<A>> BindingFactory<A> for Vec<F> {
    fn get_bindings(&self) -> Vec<Binding<A>> {
        self.iter().flat_map(|factory| factory.get_bindings()).collect()
    }
}
