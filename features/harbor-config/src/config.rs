use std::{ops::Deref, sync::Arc};

use harbor_di::{DependencyInfo, DiError, DiHandle, Resolver};

use crate::provider::ConfigProvider;

/// A wrapper type to allow for config injections
///
/// Resolves the [`ConfigProvider`] installed in the container and takes the config
/// of type `T` from it. A missing config is reported as [`DiError::ServiceNotFound`]
/// for `Config<T>`, and `Option<Config<T>>` resolves to `None` in that case.
///
/// # Example
/// ```rust
/// use harbor_config::config::Config;
/// use harbor_di::{Construct, DynError};
///
/// pub struct CatalogConfig {
///     page_size: usize,
/// }
///
/// pub struct Catalog {
///     page_size: usize,
/// }
///
/// impl Construct for Catalog {
///     type Dependencies = Config<CatalogConfig>;
///
///     fn construct(config: Config<CatalogConfig>) -> Result<Self, DynError> {
///         Ok(Catalog {
///             page_size: config.page_size,
///         })
///     }
/// }
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}

impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Config {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Send + Sync + 'static> Resolver for Config<T> {
    fn resolve(handle: &DiHandle<'_>) -> Result<Self, DiError> {
        let config_provider = handle.resolve::<ConfigProvider>()?;

        match config_provider.get_config::<T>() {
            Some(inner) => Ok(Config { inner }),
            None => {
                let key = handle.container().key_for::<Config<T>>("");
                tracing::warn!("Config missing: {key}");
                Err(DiError::ServiceNotFound(key))
            }
        }
    }

    fn dependency_info() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required::<ConfigProvider>()]
    }

    /// A missing provider and a provider without `T` both count as missing
    fn is_missing(handle: &DiHandle<'_>, error: &DiError) -> bool {
        let DiError::ServiceNotFound(missing) = error else {
            return false;
        };

        let container = handle.container();
        *missing == container.key_for::<Config<T>>("")
            || *missing == container.key_for::<ConfigProvider>("")
    }
}
