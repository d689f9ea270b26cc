use std::process::ExitCode;

use catalog::{
    model::{Product, ProductDto},
    services::{CatalogConfig, InMemoryProductRepository, Mapper, ProductDtoMapper, Repository},
    use_case::{ImportProducts, PRODUCT_MAPPER, PRODUCT_REPOSITORY},
};
use errors::CatalogError;
use harbor_config::provider::ConfigProvider;
use harbor_di::DiContainer;
use tracing_subscriber::EnvFilter;

mod catalog;
mod errors;

fn build_container() -> Result<DiContainer, CatalogError> {
    let mut config = ConfigProvider::new();
    config.add_config(CatalogConfig {
        currency: "EUR".to_string(),
    })?;

    let container = DiContainer::new();
    container.configure(|c| {
        config.install(c)?;
        c.register_named_transient::<dyn Repository<Product>, InMemoryProductRepository>(
            PRODUCT_REPOSITORY,
        )?;
        c.register_named_transient::<dyn Mapper<ProductDto, Product>, ProductDtoMapper>(
            PRODUCT_MAPPER,
        )?;
        c.register_transient_factory::<ImportProducts, _>(ImportProducts::create)
    })?;

    if let Err(errors) = container.validate() {
        tracing::warn!("{errors}");
    }

    Ok(container)
}

fn run() -> Result<(), CatalogError> {
    let container = build_container()?;
    tracing::info!("Container ready: {container:?}");

    let import = container.get_service::<ImportProducts>()?;
    tracing::info!(
        repository = import.repository.marker(),
        mapper = import.mapper.marker(),
        "Resolved use case"
    );

    let product = import.import(&ProductDto {
        id: 7,
        title: "Harbor Lantern".to_string(),
        price: "24.99 EUR".to_string(),
    });
    tracing::info!("Imported {product:?}");

    // Transient registrations hand out a fresh repository, the use case keeps its own
    let other = container.get_named_service::<dyn Repository<Product>>(PRODUCT_REPOSITORY)?;
    tracing::info!(
        "Repository #{} has product 7: {}, repository #{} has product 7: {}",
        import.repository.marker(),
        import.repository.find(7).is_some(),
        other.marker(),
        other.find(7).is_some()
    );

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,harbor_di=debug")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
