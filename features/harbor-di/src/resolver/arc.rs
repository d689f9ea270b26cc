use std::sync::Arc;

use crate::{
    errors::DiError,
    handle::DiHandle,
    resolver::Resolver,
    types::{DependencyInfo, Injectable},
};

impl<T: ?Sized + Injectable> Resolver for Arc<T> {
    fn resolve(handle: &DiHandle<'_>) -> Result<Self, DiError> {
        handle.resolve::<T>()
    }

    fn dependency_info() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required::<T>()]
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn resolve(handle: &DiHandle<'_>) -> Result<Self, DiError> {
        match Resolvable::resolve(handle) {
            Ok(resolved) => Ok(Some(resolved)),
            // Only a missing registration of our own dependency yields None,
            // a missing dependency further down the chain is still an error
            Err(e) if Resolvable::is_missing(handle, &e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn dependency_info() -> Vec<DependencyInfo> {
        Resolvable::dependency_info()
            .into_iter()
            .map(|original| DependencyInfo {
                optional: true,
                ..original
            })
            .collect()
    }
}
