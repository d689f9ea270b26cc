use std::{
    fmt::Debug,
    ops::Deref,
    sync::{Arc, OnceLock},
};

use crate::{
    container::WeakContainer,
    errors::DiError,
    handle::DiHandle,
    key::ServiceKey,
    resolver::Resolver,
    types::{DependencyInfo, Injectable, TypeInfo},
};

/// Lazily resolved dependency
///
/// The service is resolved from the container on first access, in a resolution chain
/// of its own. This allows two services to depend on each other, as long as one of them
/// only touches the other after construction.
///
/// Only the registration is checked when the `Lazy` is injected.
///
/// ### Panics
///
/// [`Lazy::get`] and `Deref` panic if the resolution failed, use [`Lazy::try_get`] to handle the error.
pub struct Lazy<T: ?Sized + Injectable>(Arc<LazyInner<T>>);

struct LazyInner<T: ?Sized + Injectable> {
    container: WeakContainer,
    key: ServiceKey,
    once: OnceLock<Result<Arc<T>, DiError>>,
}

impl<T: ?Sized + Injectable> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Lazy(self.0.clone())
    }
}

impl<T: ?Sized + Injectable + Debug> Debug for Lazy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.once.get() {
            Some(Ok(instance)) => f.debug_tuple("Lazy").field(instance).finish(),
            Some(Err(error)) => f.debug_tuple("Lazy").field(error).finish(),
            None => f.debug_tuple("Lazy").field(&format_args!("{}", self.0.key)).finish(),
        }
    }
}

impl<T: ?Sized + Injectable> Deref for Lazy<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<T: ?Sized + Injectable> Resolver for Lazy<T> {
    fn resolve(handle: &DiHandle<'_>) -> Result<Self, DiError> {
        let container = handle.container();
        let key = container.key_for::<T>("");

        // Fail early if the dependency can never be resolved
        if !container.contains_key(&key) {
            tracing::warn!("Service not found: {key}");
            return Err(DiError::ServiceNotFound(key));
        }

        Ok(Lazy(Arc::new(LazyInner {
            container: container.downgrade(),
            key,
            once: OnceLock::new(),
        })))
    }

    fn dependency_info() -> Vec<DependencyInfo> {
        vec![DependencyInfo {
            type_info: TypeInfo::of::<T>(),
            optional: false,
            lazy: true,
        }]
    }
}

impl<T: ?Sized + Injectable> Lazy<T> {
    /// Accesses the Lazy Dependency
    ///
    /// # Panics
    /// - When the dependency could not be resolved
    pub fn get(&self) -> &Arc<T> {
        match self.try_get() {
            Ok(instance) => instance,
            Err(error) => panic!("Lazy dependency '{}' failed to resolve: {error}", self.0.key),
        }
    }

    /// Try to access the lazy dependency, resolving it on first access
    pub fn try_get(&self) -> Result<&Arc<T>, &DiError> {
        self.0
            .once
            .get_or_init(|| match self.0.container.upgrade() {
                Some(container) => container.get_service::<T>(),
                None => Err(DiError::ContainerDropped(self.0.key.clone())),
            })
            .as_ref()
    }

    /// True once the dependency was resolved, successfully or not
    pub fn is_resolved(&self) -> bool {
        self.0.once.get().is_some()
    }
}
