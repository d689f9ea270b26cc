use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        RwLock,
    },
};

use harbor_config::config::Config;
use harbor_di::{Construct, DynError};

use super::model::{Product, ProductDto};

/// Every constructed service gets a distinct marker, so the demo can show which instance was injected
static NEXT_MARKER: AtomicU32 = AtomicU32::new(1);

fn next_marker() -> u32 {
    NEXT_MARKER.fetch_add(1, Ordering::SeqCst)
}

pub trait Repository<T>: Send + Sync {
    fn marker(&self) -> u32;
    fn find(&self, id: u32) -> Option<T>;
    fn save(&self, item: T);
}

pub trait Mapper<From, To>: Send + Sync {
    fn marker(&self) -> u32;
    fn map(&self, from: &From) -> To;
}

pub struct CatalogConfig {
    pub currency: String,
}

pub struct InMemoryProductRepository {
    marker: u32,
    products: RwLock<BTreeMap<u32, Product>>,
}

impl Construct for InMemoryProductRepository {
    type Dependencies = ();

    fn construct(_: ()) -> Result<Self, DynError> {
        let marker = next_marker();
        tracing::info!("Constructing product repository #{marker}");
        Ok(InMemoryProductRepository {
            marker,
            products: RwLock::default(),
        })
    }
}

impl Repository<Product> for InMemoryProductRepository {
    fn marker(&self) -> u32 {
        self.marker
    }

    fn find(&self, id: u32) -> Option<Product> {
        self.products.read().ok()?.get(&id).cloned()
    }

    fn save(&self, item: Product) {
        if let Ok(mut products) = self.products.write() {
            products.insert(item.id, item);
        }
    }
}

harbor_di::implements!(InMemoryProductRepository => dyn Repository<Product>);

pub struct ProductDtoMapper {
    marker: u32,
    currency: String,
}

impl Construct for ProductDtoMapper {
    type Dependencies = Config<CatalogConfig>;

    fn construct(config: Config<CatalogConfig>) -> Result<Self, DynError> {
        let marker = next_marker();
        tracing::info!("Constructing product mapper #{marker}");
        Ok(ProductDtoMapper {
            marker,
            currency: config.currency.clone(),
        })
    }
}

impl Mapper<ProductDto, Product> for ProductDtoMapper {
    fn marker(&self) -> u32 {
        self.marker
    }

    fn map(&self, from: &ProductDto) -> Product {
        let price_cents = from
            .price
            .trim_end_matches(self.currency.as_str())
            .trim()
            .replace('.', "")
            .parse()
            .unwrap_or_default();

        Product {
            id: from.id,
            name: from.title.clone(),
            price_cents,
        }
    }
}

harbor_di::implements!(ProductDtoMapper => dyn Mapper<ProductDto, Product>);
