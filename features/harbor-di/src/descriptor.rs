use std::{fmt::Debug, sync::Arc};

use crate::{
    errors::DiError,
    factories::{EntryPoint, FactoryFn},
    handle::DiHandle,
    key::ServiceKey,
    lifetime::{LifetimeStrategy, ServiceLifetime},
    types::{DependencyInfo, Instance, TypeInfo},
};

/// How a descriptor produces its instances
pub(crate) enum Producer {
    /// Built through the [`Construct`](crate::Construct) entry point of a concrete type
    Type(EntryPoint),
    /// Built by a user closure
    Factory(FactoryFn),
}

/// Public view on the producer of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Type(TypeInfo),
    Factory,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Type(info) => write!(f, "Type<{info}>"),
            ServiceKind::Factory => f.write_str("Factory"),
        }
    }
}

/// A registration: the contract, its producer and the lifetime strategy deciding when to produce
pub struct ServiceDescriptor {
    contract: TypeInfo,
    producer: Producer,
    strategy: Arc<dyn LifetimeStrategy>,
}

impl ServiceDescriptor {
    pub(crate) fn new(
        contract: TypeInfo,
        producer: Producer,
        strategy: Arc<dyn LifetimeStrategy>,
    ) -> Self {
        ServiceDescriptor {
            contract,
            producer,
            strategy,
        }
    }

    pub fn contract(&self) -> TypeInfo {
        self.contract
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.strategy.lifetime()
    }

    pub fn kind(&self) -> ServiceKind {
        match &self.producer {
            Producer::Type(entry_point) => ServiceKind::Type(entry_point.implementation),
            Producer::Factory(_) => ServiceKind::Factory,
        }
    }

    /// Declared dependencies of the entry point, factories declare none
    pub fn dependencies(&self) -> &[DependencyInfo] {
        match &self.producer {
            Producer::Type(entry_point) => &entry_point.dependencies,
            Producer::Factory(_) => &[],
        }
    }

    pub(crate) fn strategy(&self) -> &dyn LifetimeStrategy {
        self.strategy.as_ref()
    }

    /// Produces a new raw instance, ignoring the lifetime
    pub(crate) fn produce(
        &self,
        handle: &DiHandle<'_>,
        key: &ServiceKey,
    ) -> Result<Option<Instance>, DiError> {
        let produced = match &self.producer {
            Producer::Factory(factory) => {
                factory(handle).map_err(|error| DiError::creation(key, error))
            }
            Producer::Type(entry_point) => entry_point.invoke(handle, key).map(Some),
        };

        match &produced {
            Ok(Some(_)) => tracing::debug!("Constructed instance of {key} using {}", self.kind()),
            Ok(None) => {}
            Err(error @ DiError::InstanceCreation { .. }) => {
                tracing::error!("Error creating instance of {key}: {error}")
            }
            Err(_) => {}
        }

        produced
    }
}

impl Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("contract", &self.contract.type_name)
            .field("producer", &format_args!("{}", self.kind()))
            .field("lifetime", &self.lifetime())
            .finish()
    }
}
