use harbor_config::errors::ConfigError;
use harbor_di::DiError;

/// Everything that can stop the catalog demo
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Di(#[from] DiError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
