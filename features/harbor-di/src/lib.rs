//! Harbor DI is a runtime dependency injection container.
//!
//! Services are registered under a contract, usually a `dyn Trait`, and an optional name.
//! A registration is either backed by a type implementing [`Construct`], whose
//! dependencies are resolved from the container, or by a factory closure.
//! Every registration is either transient or singleton.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use harbor_di::{Construct, DiContainer, DynError};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Name(String);
//!
//! struct English {
//!     name: Arc<Name>,
//! }
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         format!("Hello {}", self.name.0)
//!     }
//! }
//! impl Construct for English {
//!     type Dependencies = Arc<Name>;
//!
//!     fn construct(name: Arc<Name>) -> Result<Self, DynError> {
//!         Ok(English { name })
//!     }
//! }
//! harbor_di::implements!(English => dyn Greeter);
//!
//! let container = DiContainer::new();
//! container
//!     .configure(|c| {
//!         c.register_instance::<Name>("", Arc::new(Name("Harbor".to_string())))?;
//!         c.register_singleton::<dyn Greeter, English>()
//!     })
//!     .unwrap();
//!
//! let greeter = container.get_service::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "Hello Harbor");
//! ```
//!
//! Harbor DI consists of the following components:
//!
//! 1. Container - registration phase, registration and resolution entry points
//! 2. Handle - one resolution chain, detecting cycles
//! 3. Lifetime - transient and singleton strategies
//! 4. Resolver - how constructor parameters are pulled out of the container
//! 5. Generic - reified generic shapes and type tokens
//! 6. Dependency Graph - static validation of all registrations

pub mod builder;
pub mod container;
pub mod dependency_graph;
pub mod descriptor;
pub mod errors;
pub mod factories;
pub mod generic;
pub mod handle;
pub mod key;
pub mod lifetime;
pub mod options;
mod phase;
mod registry;
pub mod resolver;
pub mod types;

pub use builder::ServiceRegistration;
pub use container::{DiContainer, ServiceInfo};
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use descriptor::{ServiceDescriptor, ServiceKind};
pub use errors::DiError;
pub use factories::{Construct, IntoService};
pub use generic::{GenericTypeDescriptor, TypeToken};
pub use handle::DiHandle;
pub use key::{KeyStrategy, ServiceKey};
pub use lifetime::{LifetimeStrategy, ServiceLifetime, SingletonStrategy, TransientStrategy};
pub use options::DiOptions;
pub use resolver::{lazy::Lazy, Resolver};
pub use types::{DependencyInfo, DynError, Implements, Injectable, Instance, TypeInfo};
