use std::sync::Arc;

use crate::{
    errors::DiError,
    handle::DiHandle,
    key::ServiceKey,
    resolver::Resolver,
    types::{DependencyInfo, DynError, Implements, Injectable, Instance, TypeInfo},
};

/// A type the container can build by itself
///
/// The declared `Dependencies` are resolved from the container with the default name,
/// in order, and handed to `construct`. Every parameter type implementing [`Resolver`]
/// can be used: `Arc<T>`, `Option<R>`, `Lazy<T>` and tuples of those.
///
/// ```
/// use std::sync::Arc;
/// use harbor_di::{Construct, DynError};
///
/// struct Clock;
/// struct Scheduler {
///     clock: Arc<Clock>,
/// }
///
/// impl Construct for Scheduler {
///     type Dependencies = Arc<Clock>;
///
///     fn construct(clock: Self::Dependencies) -> Result<Self, DynError> {
///         Ok(Scheduler { clock })
///     }
/// }
/// ```
pub trait Construct: Injectable + Sized {
    type Dependencies: Resolver;

    fn construct(dependencies: Self::Dependencies) -> Result<Self, DynError>;
}

type ConstructFn = fn(&DiHandle<'_>, &ServiceKey) -> Result<Instance, DiError>;

/// The entry point of a producible type, captured once at registration
pub(crate) struct EntryPoint {
    pub(crate) implementation: TypeInfo,
    pub(crate) dependencies: Vec<DependencyInfo>,
    construct: ConstructFn,
}

impl EntryPoint {
    pub(crate) fn of<I, C>() -> Self
    where
        I: ?Sized + Injectable,
        C: Construct + Implements<I>,
    {
        EntryPoint {
            implementation: TypeInfo::of::<C>(),
            dependencies: C::Dependencies::dependency_info(),
            construct: construct_instance::<I, C>,
        }
    }

    pub(crate) fn invoke(&self, handle: &DiHandle<'_>, key: &ServiceKey) -> Result<Instance, DiError> {
        (self.construct)(handle, key)
    }
}

fn construct_instance<I, C>(handle: &DiHandle<'_>, key: &ServiceKey) -> Result<Instance, DiError>
where
    I: ?Sized + Injectable,
    C: Construct + Implements<I>,
{
    // Dependency errors are reported as they are, only the constructor itself is wrapped
    let dependencies = C::Dependencies::resolve(handle)?;
    let constructed = C::construct(dependencies).map_err(|error| DiError::creation(key, error))?;

    Ok(Instance::new(<C as Implements<I>>::upcast(Arc::new(constructed))))
}

/// What a factory may return for the contract `I`.
///
/// `None` is reported as a null instance.
pub trait IntoService<I: ?Sized> {
    fn into_service(self) -> Option<Arc<I>>;
}

impl<I, C> IntoService<I> for Arc<C>
where
    I: ?Sized + Injectable,
    C: ?Sized + Implements<I>,
{
    fn into_service(self) -> Option<Arc<I>> {
        Some(<C as Implements<I>>::upcast(self))
    }
}

impl<I, C> IntoService<I> for Option<Arc<C>>
where
    I: ?Sized + Injectable,
    C: ?Sized + Implements<I>,
{
    fn into_service(self) -> Option<Arc<I>> {
        self.map(<C as Implements<I>>::upcast)
    }
}

pub(crate) type FactoryFn =
    Box<dyn Fn(&DiHandle<'_>) -> Result<Option<Instance>, DynError> + Send + Sync>;

pub(crate) fn boxed_factory<I, O, F>(factory: F) -> FactoryFn
where
    I: ?Sized + Injectable,
    O: IntoService<I>,
    F: Fn(&DiHandle<'_>) -> Result<O, DynError> + Send + Sync + 'static,
{
    Box::new(move |handle| {
        let output = factory(handle)?;
        Ok(output.into_service().map(Instance::new::<I>))
    })
}
