//! Dispatch index: endpoint name → method → candidate bindings.

use std::fmt;

use http::Method;
use indexmap::IndexMap;
use tracing::debug;

use crate::accept::{select_representation, RequestAccept};
use crate::dispatch::binding::{Binding, BindingFactory};
use crate::dispatch::error::DispatchError;
use crate::observability::metrics;

/// Bindings indexed by name and method, in registration order.
pub struct Dispatcher<A> {
    bindings: Vec<Binding<A>>,
    index: IndexMap<String, IndexMap<Method, Vec<usize>>>,
}

impl<A> Dispatcher<A> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            index: IndexMap::new(),
        }
    }

    pub fn from_bindings(bindings: impl IntoIterator<Item = Binding<A>>) -> Self {
        let mut dispatcher = Self::new();
        for binding in bindings {
            dispatcher.add(binding);
        }
        dispatcher
    }

    /// Register one binding after all existing ones.
    pub fn add(&mut self, binding: Binding<A>) {
        let position = self.bindings.len();
        self.index
            .entry(binding.name().to_string())
            .or_default()
            .entry(binding.method().clone())
            .or_default()
            .push(position);
        self.bindings.push(binding);
    }

    /// Register every binding a factory yields, another dispatcher included.
    pub fn add_bindings(&mut self, factory: &impl BindingFactory<A>) {
        for binding in factory.get_bindings() {
            self.add(binding);
        }
    }

    /// All bindings in registration order.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding<A>> {
        self.bindings.iter()
    }

    /// Methods registered for `name`, in registration order.
    pub fn methods(&self, name: &str) -> Option<Vec<Method>> {
        self.index
            .get(name)
            .map(|by_method| by_method.keys().cloned().collect())
    }

    /// Find the binding for `name` and `method` that best fits `request`.
    ///
    /// `HEAD` falls back to the `GET` bindings when none are registered for
    /// it. Among equally good bindings the last registered wins.
    pub fn lookup(
        &self,
        name: &str,
        method: &Method,
        request: &RequestAccept,
    ) -> Result<&Binding<A>, DispatchError> {
        let Some(by_method) = self.index.get(name) else {
            debug!(name, "no bindings for name");
            metrics::record_negotiation("not_implemented");
            return Err(DispatchError::NotImplemented {
                name: name.to_string(),
            });
        };

        let candidates = match by_method.get(method) {
            Some(candidates) => candidates,
            None if *method == Method::HEAD => match by_method.get(&Method::GET) {
                Some(candidates) => candidates,
                None => return Err(self.method_not_allowed(name, method, by_method)),
            },
            None => return Err(self.method_not_allowed(name, method, by_method)),
        };

        let binding = select_representation(
            candidates.iter().map(|&position| &self.bindings[position]),
            request,
        )?;
        Ok(binding)
    }

    fn method_not_allowed(
        &self,
        name: &str,
        method: &Method,
        by_method: &IndexMap<Method, Vec<usize>>,
    ) -> DispatchError {
        let allowed: Vec<Method> = by_method.keys().cloned().collect();
        debug!(name, method = %method, ?allowed, "method not allowed");
        metrics::record_negotiation("method_not_allowed");
        DispatchError::MethodNotAllowed { allowed }
    }
}

impl<A> Default for Dispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone> BindingFactory<A> for Dispatcher<A> {
    fn get_bindings(&self) -> Vec<Binding<A>> {
        self.bindings.clone()
    }
}

impl<A> FromIterator<Binding<A>> for Dispatcher<A> {
    fn from_iter<I: IntoIterator<Item = Binding<A>>>(iter: I) -> Self {
        Self::from_bindings(iter)
    }
}

impl<A> fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("bindings", &self.bindings)
            .finish()
    }
}
