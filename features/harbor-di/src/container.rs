use std::{
    fmt::Debug,
    sync::{Arc, Weak},
};

use crate::{
    builder::ServiceRegistration,
    dependency_graph::{DependencyGraph, DependencyGraphErrors},
    descriptor::{ServiceDescriptor, ServiceKind},
    errors::DiError,
    factories::{Construct, IntoService},
    generic::TypeToken,
    handle::DiHandle,
    key::{KeyStrategy, ServiceKey},
    lifetime::{LifetimeStrategy, ServiceLifetime, SingletonStrategy, TransientStrategy},
    options::DiOptions,
    phase::ConfigurationPhase,
    registry::ServiceRegistry,
    types::{DependencyInfo, DynError, Implements, Injectable, TypeInfo},
};

/// The dependency injection container
///
/// Registrations are only accepted inside [`DiContainer::configure`]. Resolution can happen
/// from any thread at any time. Cloning is cheap and clones share all registrations and
/// singletons.
#[derive(Clone)]
pub struct DiContainer(Arc<DiContainerInner>);

struct DiContainerInner {
    options: DiOptions,
    registry: ServiceRegistry,
    phase: ConfigurationPhase,
    transient: Arc<TransientStrategy>,
    singleton: Arc<SingletonStrategy>,
}

/// Snapshot of one registration, see [`DiContainer::list_services`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub key: ServiceKey,
    pub contract: TypeInfo,
    pub lifetime: ServiceLifetime,
    pub kind: ServiceKind,
    pub dependencies: Vec<DependencyInfo>,
}

impl Default for DiContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for DiContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("DiContainer");
        for info in self.list_services() {
            map.field(
                &info.key.to_string(),
                &format_args!("{} {}", info.lifetime, info.kind),
            );
        }
        map.finish()
    }
}

impl DiContainer {
    pub fn new() -> Self {
        Self::with_options(DiOptions::default())
    }

    pub fn with_options(options: DiOptions) -> Self {
        Self(Arc::new(DiContainerInner {
            options,
            registry: ServiceRegistry::default(),
            phase: ConfigurationPhase::default(),
            transient: Arc::new(TransientStrategy),
            singleton: Arc::new(SingletonStrategy::default()),
        }))
    }

    pub fn options(&self) -> &DiOptions {
        &self.0.options
    }

    /// Runs `action` with registrations enabled for the calling thread.
    ///
    /// The phase is closed again when the action returns, fails or panics.
    /// Calling `configure` from inside the action fails with [`DiError::ConfigurationState`]
    /// and the nested action is not run.
    pub fn configure<F>(&self, action: F) -> Result<(), DiError>
    where
        F: FnOnce(&DiContainer) -> Result<(), DiError>,
    {
        let _phase = self.0.phase.open()?;
        action(self)
    }

    /// True while the calling thread is inside [`DiContainer::configure`]
    pub fn is_configuring(&self) -> bool {
        self.0.phase.is_open()
    }

    // ###############################################
    // Registration

    /// Adds a registration, replacing any registration under the same key
    pub fn add<I: ?Sized + Injectable>(
        &self,
        registration: ServiceRegistration<I>,
    ) -> Result<(), DiError> {
        self.0.phase.ensure_open()?;

        let (name, lifetime, producer) = registration.into_parts()?;
        let key = self.key_for::<I>(&name);
        let descriptor = ServiceDescriptor::new(TypeInfo::of::<I>(), producer, self.strategy(lifetime));

        tracing::debug!("Registering {key} as {lifetime} {}", descriptor.kind());
        if let Some(previous) = self.0.registry.insert(key.clone(), descriptor) {
            tracing::warn!(
                "Duplicate registration for key: {key}. Overwriting existing service {previous:?}"
            );
            self.0.singleton.evict(&key);
        }

        Ok(())
    }

    /// Registers `C` as the implementation of `I`
    pub fn register<I, C>(&self, name: &str, lifetime: ServiceLifetime) -> Result<(), DiError>
    where
        I: ?Sized + Injectable,
        C: Construct + Implements<I>,
    {
        self.add(
            ServiceRegistration::<I>::new()
                .named(name)
                .lifetime(lifetime)
                .implemented_by::<C>(),
        )
    }

    /// Registers a factory producing `I`
    pub fn register_factory<I, O>(
        &self,
        name: &str,
        lifetime: ServiceLifetime,
        factory: impl Fn(&DiHandle<'_>) -> Result<O, DynError> + Send + Sync + 'static,
    ) -> Result<(), DiError>
    where
        I: ?Sized + Injectable,
        O: IntoService<I>,
    {
        self.add(
            ServiceRegistration::<I>::new()
                .named(name)
                .lifetime(lifetime)
                .factory(factory),
        )
    }

    /// Registers an existing instance as singleton
    pub fn register_instance<I: ?Sized + Injectable>(
        &self,
        name: &str,
        instance: Arc<I>,
    ) -> Result<(), DiError> {
        self.add(ServiceRegistration::<I>::new().named(name).instance(instance))
    }

    pub fn register_transient<I: ?Sized + Injectable, C: Construct + Implements<I>>(
        &self,
    ) -> Result<(), DiError> {
        self.register::<I, C>("", ServiceLifetime::Transient)
    }

    pub fn register_singleton<I: ?Sized + Injectable, C: Construct + Implements<I>>(
        &self,
    ) -> Result<(), DiError> {
        self.register::<I, C>("", ServiceLifetime::Singleton)
    }

    pub fn register_named_transient<I: ?Sized + Injectable, C: Construct + Implements<I>>(
        &self,
        name: &str,
    ) -> Result<(), DiError> {
        self.register::<I, C>(name, ServiceLifetime::Transient)
    }

    pub fn register_named_singleton<I: ?Sized + Injectable, C: Construct + Implements<I>>(
        &self,
        name: &str,
    ) -> Result<(), DiError> {
        self.register::<I, C>(name, ServiceLifetime::Singleton)
    }

    pub fn register_transient_factory<I: ?Sized + Injectable, O: IntoService<I>>(
        &self,
        factory: impl Fn(&DiHandle<'_>) -> Result<O, DynError> + Send + Sync + 'static,
    ) -> Result<(), DiError> {
        self.register_factory::<I, O>("", ServiceLifetime::Transient, factory)
    }

    pub fn register_singleton_factory<I: ?Sized + Injectable, O: IntoService<I>>(
        &self,
        factory: impl Fn(&DiHandle<'_>) -> Result<O, DynError> + Send + Sync + 'static,
    ) -> Result<(), DiError> {
        self.register_factory::<I, O>("", ServiceLifetime::Singleton, factory)
    }

    pub fn register_named_transient_factory<I: ?Sized + Injectable, O: IntoService<I>>(
        &self,
        name: &str,
        factory: impl Fn(&DiHandle<'_>) -> Result<O, DynError> + Send + Sync + 'static,
    ) -> Result<(), DiError> {
        self.register_factory::<I, O>(name, ServiceLifetime::Transient, factory)
    }

    pub fn register_named_singleton_factory<I: ?Sized + Injectable, O: IntoService<I>>(
        &self,
        name: &str,
        factory: impl Fn(&DiHandle<'_>) -> Result<O, DynError> + Send + Sync + 'static,
    ) -> Result<(), DiError> {
        self.register_factory::<I, O>(name, ServiceLifetime::Singleton, factory)
    }

    // ###############################################
    // Resolution

    /// Resolves the default registration of `I`
    pub fn get_service<I: ?Sized + Injectable>(&self) -> Result<Arc<I>, DiError> {
        DiHandle::new(self).resolve::<I>()
    }

    /// Resolves the registration of `I` under `name`
    pub fn get_named_service<I: ?Sized + Injectable>(&self, name: &str) -> Result<Arc<I>, DiError> {
        DiHandle::new(self).resolve_named::<I>(name)
    }

    /// Resolves `I` through a captured generic shape
    pub fn get_service_by_token<I: ?Sized + Injectable>(
        &self,
        name: &str,
        token: &TypeToken<I>,
    ) -> Result<Arc<I>, DiError> {
        DiHandle::new(self).resolve_token(name, token)
    }

    /// True if something is registered for `I` under `name`
    pub fn contains<I: ?Sized + Injectable>(&self, name: &str) -> bool {
        self.contains_key(&self.key_for::<I>(name))
    }

    pub fn contains_key(&self, key: &ServiceKey) -> bool {
        self.0.registry.contains(key)
    }

    // ###############################################
    // Diagnostics

    /// Read only snapshot of all registrations, sorted by key
    pub fn list_services(&self) -> Vec<ServiceInfo> {
        self.0
            .registry
            .snapshot()
            .into_iter()
            .map(|(key, descriptor)| ServiceInfo {
                key,
                contract: descriptor.contract(),
                lifetime: descriptor.lifetime(),
                kind: descriptor.kind(),
                dependencies: descriptor.dependencies().to_vec(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of singletons created so far
    pub fn cached_singletons(&self) -> usize {
        self.0.singleton.cached()
    }

    /// Checks the declared dependencies of all registrations for missing and circular dependencies
    pub fn validate(&self) -> Result<(), DependencyGraphErrors> {
        DependencyGraph::new(self).check()
    }

    // ###############################################
    // Keys

    pub fn key_for<I: ?Sized + 'static>(&self, name: &str) -> ServiceKey {
        ServiceKey::of::<I>(self.0.options.key_strategy, name)
    }

    pub fn key_for_info(&self, info: TypeInfo, name: &str) -> ServiceKey {
        ServiceKey::from_type_info(info, self.0.options.key_strategy, name)
    }

    /// Derives the key of a type token, rejecting wildcard and mismatching shapes
    pub fn key_for_token<I: ?Sized + 'static>(
        &self,
        name: &str,
        token: &TypeToken<I>,
    ) -> Result<ServiceKey, DiError> {
        let descriptor = token.descriptor();
        if !descriptor.is_concrete() {
            return Err(DiError::InvalidArgument(format!(
                "type token '{descriptor}' must represent a concrete type"
            )));
        }

        match self.0.options.key_strategy {
            KeyStrategy::Erased => Ok(ServiceKey::erased(descriptor.raw_simple_name(), name)),
            KeyStrategy::Reified => {
                let reified = TypeToken::<I>::new();
                if !descriptor.matches(reified.descriptor()) {
                    return Err(DiError::InvalidArgument(format!(
                        "type token '{descriptor}' does not describe '{}'",
                        reified.descriptor()
                    )));
                }
                Ok(self.key_for::<I>(name))
            }
        }
    }

    // ###############################################
    // Internal

    pub(crate) fn descriptor(&self, key: &ServiceKey) -> Option<Arc<ServiceDescriptor>> {
        self.0.registry.get(key)
    }

    pub(crate) fn downgrade(&self) -> WeakContainer {
        WeakContainer(Arc::downgrade(&self.0))
    }

    fn strategy(&self, lifetime: ServiceLifetime) -> Arc<dyn LifetimeStrategy> {
        match lifetime {
            ServiceLifetime::Transient => self.0.transient.clone(),
            ServiceLifetime::Singleton => self.0.singleton.clone(),
        }
    }
}

/// A container reference which does not keep the container alive
#[derive(Clone)]
pub(crate) struct WeakContainer(Weak<DiContainerInner>);

impl WeakContainer {
    pub(crate) fn upgrade(&self) -> Option<DiContainer> {
        self.0.upgrade().map(DiContainer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Cache: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct InMemoryCache;
    impl Cache for InMemoryCache {
        fn name(&self) -> &'static str {
            "in-memory"
        }
    }
    impl Construct for InMemoryCache {
        type Dependencies = ();

        fn construct(_: ()) -> Result<Self, DynError> {
            Ok(InMemoryCache)
        }
    }
    crate::implements!(InMemoryCache => dyn Cache);

    #[test]
    fn it_lists_services_sorted() {
        let container = DiContainer::new();
        container
            .configure(|c| {
                c.register_named_singleton::<dyn Cache, InMemoryCache>("b")?;
                c.register_named_transient_factory::<dyn Cache, _>("a", |_| Ok(Arc::new(InMemoryCache)))
            })
            .unwrap();

        let services = container.list_services();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].key.to_string(), "dyn Cache#a");
        assert_eq!(services[0].kind, ServiceKind::Factory);
        assert_eq!(services[0].lifetime, ServiceLifetime::Transient);
        assert_eq!(services[1].key.to_string(), "dyn Cache#b");
        assert_eq!(services[1].kind, ServiceKind::Type(TypeInfo::of::<InMemoryCache>()));
        assert_eq!(services[1].lifetime, ServiceLifetime::Singleton);
    }

    #[test]
    fn it_debugs_registrations() {
        let container = DiContainer::new();
        container
            .configure(|c| c.register_singleton::<dyn Cache, InMemoryCache>())
            .unwrap();

        let debug = format!("{container:?}");
        assert!(debug.contains("dyn Cache"));
        assert!(debug.contains("singleton"));
    }

    #[test]
    fn clones_share_singletons() {
        let container = DiContainer::new();
        container
            .configure(|c| c.register_singleton::<dyn Cache, InMemoryCache>())
            .unwrap();

        let clone = container.clone();
        let a = container.get_service::<dyn Cache>().unwrap();
        let b = clone.get_service::<dyn Cache>().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.name(), "in-memory");
        assert_eq!(container.cached_singletons(), 1);
    }

    #[test]
    fn containers_do_not_share_singletons() {
        let first = DiContainer::new();
        let second = DiContainer::new();
        for container in [&first, &second] {
            container
                .configure(|c| c.register_singleton::<dyn Cache, InMemoryCache>())
                .unwrap();
        }

        let a = first.get_service::<dyn Cache>().unwrap();
        let b = second.get_service::<dyn Cache>().unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }
}
