use crate::{errors::DiError, handle::DiHandle, types::DependencyInfo};

pub mod arc;
pub mod lazy;
mod tuple;

/// Describes how a constructor parameter is pulled out of the container
///
/// Implemented for `Arc<T>` (required), `Option<R>` (missing becomes `None`),
/// [`Lazy<T>`](lazy::Lazy) (resolved on first access), `()` and tuples of resolvers.
pub trait Resolver: Sized {
    fn resolve(handle: &DiHandle<'_>) -> Result<Self, DiError>;

    /// The dependencies this resolver declares, in order
    fn dependency_info() -> Vec<DependencyInfo>;

    /// True if `error` only says that this resolver's own dependency is not available.
    ///
    /// `Option<R>` turns exactly these errors into `None`. The default matches
    /// [`DiError::ServiceNotFound`] for any of the declared dependencies.
    fn is_missing(handle: &DiHandle<'_>, error: &DiError) -> bool {
        let DiError::ServiceNotFound(missing) = error else {
            return false;
        };

        Self::dependency_info()
            .iter()
            .any(|dependency| &handle.container().key_for_info(dependency.type_info, "") == missing)
    }
}
