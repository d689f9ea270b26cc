use std::{any::type_name, cell::RefCell, sync::Arc};

use crate::{
    container::DiContainer,
    errors::DiError,
    generic::TypeToken,
    key::ServiceKey,
    resolver::Resolver,
    types::{Injectable, Instance},
};

/// DI Handle for resolving dependencies during one resolution chain.
///
/// Every top level request on the [`DiContainer`] creates a new handle. Factories and
/// constructors receive it to resolve their own dependencies, and it carries the keys
/// currently being resolved so cycles are detected. The handle is neither `Send` nor
/// `Sync`, a chain never leaks into another thread.
pub struct DiHandle<'c> {
    container: &'c DiContainer,
    in_flight: RefCell<Vec<ServiceKey>>,
}

impl<'c> DiHandle<'c> {
    pub(crate) fn new(container: &'c DiContainer) -> Self {
        DiHandle {
            container,
            in_flight: RefCell::new(Vec::new()),
        }
    }

    pub fn container(&self) -> &'c DiContainer {
        self.container
    }

    /// Resolves the default registration of `I`
    pub fn resolve<I: ?Sized + Injectable>(&self) -> Result<Arc<I>, DiError> {
        self.resolve_named("")
    }

    /// Resolves the registration of `I` registered under `name`
    pub fn resolve_named<I: ?Sized + Injectable>(&self, name: &str) -> Result<Arc<I>, DiError> {
        let key = self.container.key_for::<I>(name);
        self.resolve_key(key)
    }

    /// Resolves `I` through a captured generic shape
    pub fn resolve_token<I: ?Sized + Injectable>(
        &self,
        name: &str,
        token: &TypeToken<I>,
    ) -> Result<Arc<I>, DiError> {
        let key = self.container.key_for_token(name, token)?;
        self.resolve_key(key)
    }

    /// Resolves anything implementing [`Resolver`], e.g. a tuple of dependencies
    pub fn inject<R: Resolver>(&self) -> Result<R, DiError> {
        R::resolve(self)
    }

    /// Keys currently being resolved, outermost first
    pub fn in_flight(&self) -> Vec<ServiceKey> {
        self.in_flight.borrow().clone()
    }

    fn resolve_key<I: ?Sized + Injectable>(&self, key: ServiceKey) -> Result<Arc<I>, DiError> {
        let instance = self.resolve_instance(&key)?;
        instance
            .downcast::<I>()
            .map_err(|actual| DiError::TypeMismatch {
                key,
                expected: type_name::<I>(),
                actual,
            })
    }

    pub(crate) fn resolve_instance(&self, key: &ServiceKey) -> Result<Instance, DiError> {
        let _in_flight = self.enter(key)?;
        tracing::trace!("Resolving {key}");

        let Some(descriptor) = self.container.descriptor(key) else {
            tracing::warn!("Service not found: {key}");
            return Err(DiError::ServiceNotFound(key.clone()));
        };

        match descriptor.strategy().get_instance(self, &descriptor, key)? {
            Some(instance) => Ok(instance),
            None => {
                tracing::warn!("Null instance returned for key: {key}");
                Err(DiError::NullInstance(key.clone()))
            }
        }
    }

    /// Marks the key as in flight until the guard is dropped
    fn enter(&self, key: &ServiceKey) -> Result<InFlight<'_>, DiError> {
        let mut in_flight = self.in_flight.borrow_mut();
        if in_flight.contains(key) {
            let mut chain = in_flight.clone();
            chain.push(key.clone());

            tracing::error!("Cyclic dependency detected for key: {key}");
            return Err(DiError::CyclicDependency {
                key: key.clone(),
                chain,
            });
        }

        in_flight.push(key.clone());
        Ok(InFlight {
            in_flight: &self.in_flight,
        })
    }
}

struct InFlight<'h> {
    in_flight: &'h RefCell<Vec<ServiceKey>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // Guards drop in reverse order of entering, so the last key is ours
        self.in_flight.borrow_mut().pop();
    }
}
