use std::sync::Arc;

use thiserror::Error;

use crate::{key::ServiceKey, types::DynError};

/// Errors while registering or resolving services
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// Registration outside of `configure`, or `configure` called from inside `configure`
    #[error("Configuration state error: {0}")]
    ConfigurationState(&'static str),

    /// The instance stored under the key is not of the requested contract
    #[error("Service '{key}' holds a '{actual}' which is not the requested '{expected}'")]
    TypeMismatch {
        key: ServiceKey,
        expected: &'static str,
        actual: &'static str,
    },

    /// A registration or type token was malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Nothing is registered under the key
    #[error("Service not found: '{0}'")]
    ServiceNotFound(ServiceKey),

    /// The key is already being resolved further up the same resolution chain
    #[error("Cyclic dependency detected for '{key}' through {} - Consider using `Lazy`", format_chain(.chain))]
    CyclicDependency {
        key: ServiceKey,
        chain: Vec<ServiceKey>,
    },

    /// A factory produced no instance
    #[error("Null instance returned for: '{0}'")]
    NullInstance(ServiceKey),

    /// A factory or constructor failed
    #[error("Error creating instance of '{key}': {source}")]
    InstanceCreation {
        key: ServiceKey,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A `Lazy` outlived the container it resolves from
    #[error("The container was dropped before '{0}' could be resolved")]
    ContainerDropped(ServiceKey),
}

impl DiError {
    /// Wraps any failure of a factory or constructor body as [`DiError::InstanceCreation`].
    ///
    /// Container errors raised inside the body, for example by a nested resolution in a
    /// factory, are wrapped as well and stay reachable through [`std::error::Error::source`].
    pub(crate) fn creation(key: &ServiceKey, error: DynError) -> Self {
        DiError::InstanceCreation {
            key: key.clone(),
            source: Arc::from(error),
        }
    }

    /// The innermost container error in the chain of [`DiError::InstanceCreation`] sources
    pub fn root_cause(&self) -> &DiError {
        let mut current = self;
        while let DiError::InstanceCreation { source, .. } = current {
            match source.downcast_ref::<DiError>() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }
}

pub(crate) fn format_chain(chain: &[ServiceKey]) -> String {
    chain
        .iter()
        .map(ServiceKey::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
