//! Lifetime strategies, deciding whether a descriptor produces on every request or once

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock, PoisonError, RwLock},
};

use crate::{
    descriptor::ServiceDescriptor, errors::DiError, handle::DiHandle, key::ServiceKey,
    types::Instance,
};

/// Lifetime of a registration, fixed when it is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceLifetime {
    /// A new instance on every request
    #[default]
    Transient,
    /// Created on first request and reused afterwards
    Singleton,
}

impl std::fmt::Display for ServiceLifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceLifetime::Transient => f.write_str("transient"),
            ServiceLifetime::Singleton => f.write_str("singleton"),
        }
    }
}

/// Obtains an instance for a descriptor, producing it when needed.
///
/// Strategies are the only callers of [`ServiceDescriptor::produce`].
pub trait LifetimeStrategy: Send + Sync {
    fn lifetime(&self) -> ServiceLifetime;

    fn get_instance(
        &self,
        handle: &DiHandle<'_>,
        descriptor: &ServiceDescriptor,
        key: &ServiceKey,
    ) -> Result<Option<Instance>, DiError>;
}

/// Produces a fresh instance on every request
#[derive(Debug, Default)]
pub struct TransientStrategy;

impl LifetimeStrategy for TransientStrategy {
    fn lifetime(&self) -> ServiceLifetime {
        ServiceLifetime::Transient
    }

    fn get_instance(
        &self,
        handle: &DiHandle<'_>,
        descriptor: &ServiceDescriptor,
        key: &ServiceKey,
    ) -> Result<Option<Instance>, DiError> {
        descriptor.produce(handle, key)
    }
}

/// Produces once per key and caches the instance.
///
/// Every container owns its own strategy, and with it its own cache.
/// Each key has its own creation lock, so building a singleton which depends on
/// other singletons never waits on itself.
#[derive(Default)]
pub struct SingletonStrategy {
    slots: RwLock<HashMap<ServiceKey, Arc<Slot>>>,
}

#[derive(Default)]
struct Slot {
    instance: OnceLock<Instance>,
    creating: Mutex<()>,
}

impl SingletonStrategy {
    fn slot(&self, key: &ServiceKey) -> Arc<Slot> {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return slot.clone();
        }

        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone()
    }

    /// Drops the cached instance of a key, the next request produces again
    pub(crate) fn evict(&self, key: &ServiceKey) {
        let evicted = self
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        if evicted.is_some_and(|slot| slot.instance.get().is_some()) {
            tracing::debug!("Evicted cached singleton for {key}");
        }
    }

    /// Number of singletons created so far
    pub fn cached(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.instance.get().is_some())
            .count()
    }
}

impl LifetimeStrategy for SingletonStrategy {
    fn lifetime(&self) -> ServiceLifetime {
        ServiceLifetime::Singleton
    }

    fn get_instance(
        &self,
        handle: &DiHandle<'_>,
        descriptor: &ServiceDescriptor,
        key: &ServiceKey,
    ) -> Result<Option<Instance>, DiError> {
        let slot = self.slot(key);
        if let Some(instance) = slot.instance.get() {
            tracing::trace!("Singleton cache hit for {key}");
            return Ok(Some(instance.clone()));
        }

        let _creating = slot.creating.lock().unwrap_or_else(PoisonError::into_inner);

        // Double check - another thread might have created it while we waited for the lock
        if let Some(instance) = slot.instance.get() {
            return Ok(Some(instance.clone()));
        }

        let produced = descriptor.produce(handle, key)?;
        if let Some(instance) = &produced {
            let _ = slot.instance.set(instance.clone());
            tracing::debug!("Cached singleton for {key}");
        }

        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;
    use crate::{container::DiContainer, key::KeyStrategy};

    struct Counted(usize);

    fn counting_container(counter: Arc<AtomicUsize>) -> DiContainer {
        let container = DiContainer::new();
        container
            .configure(|c| {
                c.register_named_singleton_factory::<Counted, _>("once", {
                    let counter = counter.clone();
                    move |_| Ok(Arc::new(Counted(counter.fetch_add(1, Ordering::SeqCst))))
                })?;
                c.register_named_transient_factory::<Counted, _>("every", move |_| {
                    Ok(Arc::new(Counted(counter.fetch_add(1, Ordering::SeqCst))))
                })
            })
            .unwrap();
        container
    }

    #[test]
    fn singleton_produces_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = counting_container(counter.clone());

        let a = container.get_named_service::<Counted>("once").unwrap();
        let b = container.get_named_service::<Counted>("once").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.0, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn transient_produces_every_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = counting_container(counter.clone());

        let a = container.get_named_service::<Counted>("every").unwrap();
        let b = container.get_named_service::<Counted>("every").unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn absent_instances_are_not_cached() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = DiContainer::new();
        container
            .configure(|c| {
                let counter = counter.clone();
                c.register_singleton_factory::<Counted, _>(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(None::<Arc<Counted>>)
                })
            })
            .unwrap();

        for _ in 0..2 {
            assert!(matches!(
                container.get_service::<Counted>(),
                Err(DiError::NullInstance(_))
            ));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn eviction_forgets_the_instance() {
        let strategy = SingletonStrategy::default();
        let key = ServiceKey::of::<Counted>(KeyStrategy::Reified, "");

        let slot = strategy.slot(&key);
        let _ = slot.instance.set(Instance::new(Arc::new(Counted(7))));
        assert_eq!(strategy.cached(), 1);

        strategy.evict(&key);
        assert_eq!(strategy.cached(), 0);
        assert!(strategy.slot(&key).instance.get().is_none());
    }
}
