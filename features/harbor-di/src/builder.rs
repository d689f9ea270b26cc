use std::{any::type_name, marker::PhantomData, sync::Arc};

use crate::{
    descriptor::Producer,
    errors::DiError,
    factories::{boxed_factory, Construct, EntryPoint, FactoryFn, IntoService},
    handle::DiHandle,
    lifetime::ServiceLifetime,
    types::{DynError, Implements, Injectable},
};

/// A single registration for the contract `I`, handed to [`DiContainer::add`](crate::DiContainer::add)
///
/// Exactly one producer must be set: either an implementation type or a factory.
///
/// ```
/// use std::sync::Arc;
/// use harbor_di::{DiContainer, ServiceLifetime, ServiceRegistration};
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
/// struct Fixed;
/// impl Clock for Fixed {
///     fn now(&self) -> u64 {
///         42
///     }
/// }
/// harbor_di::implements!(Fixed => dyn Clock);
///
/// let container = DiContainer::new();
/// container
///     .configure(|c| {
///         c.add(
///             ServiceRegistration::<dyn Clock>::new()
///                 .named("fixed")
///                 .lifetime(ServiceLifetime::Singleton)
///                 .factory(|_| Ok(Arc::new(Fixed))),
///         )
///     })
///     .unwrap();
///
/// let clock = container.get_named_service::<dyn Clock>("fixed").unwrap();
/// assert_eq!(clock.now(), 42);
/// ```
pub struct ServiceRegistration<I: ?Sized> {
    name: String,
    lifetime: ServiceLifetime,
    entry_point: Option<EntryPoint>,
    factory: Option<FactoryFn>,
    _contract: PhantomData<fn() -> Box<I>>,
}

impl<I: ?Sized + Injectable> Default for ServiceRegistration<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized + Injectable> ServiceRegistration<I> {
    /// An unnamed, transient registration without a producer
    pub fn new() -> Self {
        ServiceRegistration {
            name: String::new(),
            lifetime: ServiceLifetime::Transient,
            entry_point: None,
            factory: None,
            _contract: PhantomData,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn lifetime(mut self, lifetime: ServiceLifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Produce instances by constructing `C`
    pub fn implemented_by<C: Construct + Implements<I>>(mut self) -> Self {
        self.entry_point = Some(EntryPoint::of::<I, C>());
        self
    }

    /// Produce instances with a factory
    pub fn factory<O, F>(mut self, factory: F) -> Self
    where
        O: IntoService<I>,
        F: Fn(&DiHandle<'_>) -> Result<O, DynError> + Send + Sync + 'static,
    {
        self.factory = Some(boxed_factory::<I, O, F>(factory));
        self
    }

    /// Produce instances with a factory, if there is one.
    ///
    /// Registering without any producer fails with [`DiError::InvalidArgument`].
    pub fn maybe_factory<O, F>(self, factory: Option<F>) -> Self
    where
        O: IntoService<I>,
        F: Fn(&DiHandle<'_>) -> Result<O, DynError> + Send + Sync + 'static,
    {
        match factory {
            Some(factory) => self.factory(factory),
            None => self,
        }
    }

    /// Serve an already created instance, implies a singleton lifetime
    pub fn instance(self, instance: Arc<I>) -> Self {
        self.lifetime(ServiceLifetime::Singleton)
            .factory(move |_| Ok(instance.clone()))
    }

    pub(crate) fn into_parts(self) -> Result<(String, ServiceLifetime, Producer), DiError> {
        let producer = match (self.entry_point, self.factory) {
            (Some(entry_point), None) => Producer::Type(entry_point),
            (None, Some(factory)) => Producer::Factory(factory),
            (None, None) => {
                tracing::warn!("Factory cannot be null for {}", type_name::<I>());
                return Err(DiError::InvalidArgument(format!(
                    "registration of '{}' has neither an implementation nor a factory",
                    type_name::<I>()
                )));
            }
            (Some(_), Some(_)) => {
                return Err(DiError::InvalidArgument(format!(
                    "registration of '{}' has both an implementation and a factory",
                    type_name::<I>()
                )))
            }
        };

        Ok((self.name, self.lifetime, producer))
    }
}
