use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use harbor_di::{DiContainer, DiError, TypeInfo};

use crate::errors::ConfigError;

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, Arc<dyn Any + Send + Sync + 'static>>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type, `None` if it was never added
    pub fn get_config<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.configs
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.clone().downcast().ok())
    }

    /// Retrieve a config with specified type.
    ///
    /// If the config type is not available, it will return [`ConfigError::Missing`]
    pub fn require_config<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ConfigError> {
        self.get_config()
            .ok_or_else(|| ConfigError::Missing(TypeInfo::of::<T>()))
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return
    /// [`ConfigError::AlreadyRegistered`]
    pub fn add_config<T: Send + Sync + 'static>(
        &mut self,
        config: T,
    ) -> Result<&mut Self, ConfigError> {
        let type_id = TypeId::of::<T>();

        if self.configs.contains_key(&type_id) {
            tracing::warn!("Config {} registered twice", std::any::type_name::<T>());
            return Err(ConfigError::AlreadyRegistered(TypeInfo::of::<T>()));
        }

        self.configs.insert(type_id, Arc::new(config));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Send + Sync + 'static>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Registers the provider as singleton instance, so [`Config`](crate::config::Config)
    /// dependencies can be resolved.
    ///
    /// Must be called inside [`DiContainer::configure`].
    pub fn install(self, container: &DiContainer) -> Result<(), DiError> {
        tracing::debug!("Installing config provider with {} configs", self.len());
        container.register_instance::<ConfigProvider>("", Arc::new(self))
    }
}
