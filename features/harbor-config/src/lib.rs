//! Harbor Config provides a registry of typed configs that can be injected into services.
//!
//! Harbor Config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs
//! 2. Config<T>: A wrapper type to resolve configs as constructor dependencies
//!
//! # Examples
//!
//! ```rust
//! use harbor_config::{config::Config, provider::ConfigProvider};
//! use harbor_di::{Construct, DiContainer, DynError};
//!
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! struct Server {
//!     address: String,
//! }
//! impl Construct for Server {
//!     type Dependencies = Config<AppConfig>;
//!
//!     fn construct(config: Config<AppConfig>) -> Result<Self, DynError> {
//!         Ok(Server {
//!             address: format!("{}:{}", config.host, config.port),
//!         })
//!     }
//! }
//!
//! let mut provider = ConfigProvider::new();
//! provider
//!     .add_config(AppConfig {
//!         host: "localhost".to_string(),
//!         port: 8080,
//!     })
//!     .unwrap();
//!
//! let container = DiContainer::new();
//! container
//!     .configure(|c| {
//!         provider.install(c)?;
//!         c.register_singleton::<Server, Server>()
//!     })
//!     .unwrap();
//!
//! let server = container.get_service::<Server>().unwrap();
//! assert_eq!(server.address, "localhost:8080");
//! ```
//!
//! Harbor Config consists of the following components:
//!
//! 1. Config - for handling resolution of a single config
//! 2. Provider - for creating a registry of configs, adding and retrieving configs
//! 3. Errors - for config errors

pub mod config;
pub mod errors;
pub mod provider;
