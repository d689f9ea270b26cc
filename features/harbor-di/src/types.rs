use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Error returned by user constructors and factories
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Resolution may happen on any thread, so anything injectable needs to be Send + Sync + 'static.
///
/// Unsized types are allowed, contracts are usually `dyn Trait`.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Declares that `Self` may be served where the contract `I` is requested.
///
/// Every type implements its own contract. For trait objects use [`implements!`](crate::implements)
/// or write the impl by hand, the body is always `self` and the coercion is done by the compiler.
pub trait Implements<I: ?Sized>: Injectable {
    fn upcast(self: Arc<Self>) -> Arc<I>;
}
impl<T: ?Sized + Injectable> Implements<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Implements [`Implements`] for one type and a list of contracts
///
/// ```
/// trait Greeter: Send + Sync {}
/// struct English;
/// impl Greeter for English {}
///
/// harbor_di::implements!(English => dyn Greeter);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($contract:ty),+ $(,)?) => {
        $(
            impl $crate::types::Implements<$contract> for $implementation {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$contract> {
                    self
                }
            }
        )+
    };
}

/// A produced service, erased to the contract it was registered for
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<I: ?Sized + Injectable>(instance: Arc<I>) -> Self {
        Instance {
            info: TypeInfo::of::<I>(),
            instance: Arc::new(instance),
        }
    }

    /// Returns the shared service, or the name of the stored contract on mismatch
    pub fn downcast<I: ?Sized + Injectable>(&self) -> Result<Arc<I>, &'static str> {
        match self.instance.downcast_ref::<Arc<I>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }

    /// True if both instances point to the same allocation
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

/// Information about a constructor dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyInfo {
    /// The required Type
    pub type_info: TypeInfo,
    /// If it is optional or required
    pub optional: bool,
    /// If the Dependency is resolved on first access instead of during construction
    pub lazy: bool,
}

impl DependencyInfo {
    pub fn required<T: ?Sized + 'static>() -> Self {
        DependencyInfo {
            type_info: TypeInfo::of::<T>(),
            optional: false,
            lazy: false,
        }
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}
