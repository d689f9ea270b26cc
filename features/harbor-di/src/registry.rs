use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{descriptor::ServiceDescriptor, key::ServiceKey};

/// Concurrent mapping of keys to descriptors.
///
/// Descriptors are handed out as `Arc`s, so no lock is held while an instance is produced.
#[derive(Default)]
pub(crate) struct ServiceRegistry {
    services: RwLock<HashMap<ServiceKey, Arc<ServiceDescriptor>>>,
}

impl ServiceRegistry {
    /// Stores the descriptor, returning the one it replaced
    pub(crate) fn insert(
        &self,
        key: ServiceKey,
        descriptor: ServiceDescriptor,
    ) -> Option<Arc<ServiceDescriptor>> {
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(descriptor))
    }

    pub(crate) fn get(&self, key: &ServiceKey) -> Option<Arc<ServiceDescriptor>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub(crate) fn contains(&self, key: &ServiceKey) -> bool {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Copy of all entries, sorted by key
    pub(crate) fn snapshot(&self) -> Vec<(ServiceKey, Arc<ServiceDescriptor>)> {
        let mut entries = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, descriptor)| (key.clone(), descriptor.clone()))
            .collect::<Vec<_>>();

        entries.sort_by_cached_key(|(key, _)| key.to_string());
        entries
    }

    pub(crate) fn len(&self) -> usize {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
