use std::sync::Arc;

use harbor_di::{DiHandle, DynError};

use super::{
    model::{Product, ProductDto},
    services::{Mapper, Repository},
};

pub const PRODUCT_REPOSITORY: &str = "product";
pub const PRODUCT_MAPPER: &str = "mapperProductDTO";

/// Imports products from their transfer representation
pub struct ImportProducts {
    pub repository: Arc<dyn Repository<Product>>,
    pub mapper: Arc<dyn Mapper<ProductDto, Product>>,
}

impl ImportProducts {
    /// Factory resolving the named repository and mapper
    pub fn create(handle: &DiHandle<'_>) -> Result<Arc<ImportProducts>, DynError> {
        Ok(Arc::new(ImportProducts {
            repository: handle.resolve_named::<dyn Repository<Product>>(PRODUCT_REPOSITORY)?,
            mapper: handle.resolve_named::<dyn Mapper<ProductDto, Product>>(PRODUCT_MAPPER)?,
        }))
    }

    pub fn import(&self, dto: &ProductDto) -> Product {
        let product = self.mapper.map(dto);
        self.repository.save(product.clone());
        product
    }
}
