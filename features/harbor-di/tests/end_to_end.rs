use std::{
    marker::PhantomData,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use harbor_di::{Construct, DiContainer, DiHandle, DynError, ServiceKind, ServiceLifetime};

static NEXT_MARKER: AtomicU32 = AtomicU32::new(100);

struct Product;
struct ProductDto;

trait Repository<T>: Send + Sync {
    fn marker(&self) -> u32;
}

trait Mapper<S, T>: Send + Sync {
    fn marker(&self) -> u32;
}

struct ProductRepository {
    marker: u32,
}
impl Repository<Product> for ProductRepository {
    fn marker(&self) -> u32 {
        self.marker
    }
}
impl Construct for ProductRepository {
    type Dependencies = ();
    fn construct(_: ()) -> Result<Self, DynError> {
        Ok(ProductRepository {
            marker: NEXT_MARKER.fetch_add(1, Ordering::SeqCst),
        })
    }
}

struct DtoMapper<S, T> {
    marker: u32,
    _types: PhantomData<fn(S) -> T>,
}
impl Mapper<ProductDto, Product> for DtoMapper<ProductDto, Product> {
    fn marker(&self) -> u32 {
        self.marker
    }
}
impl Construct for DtoMapper<ProductDto, Product> {
    type Dependencies = ();
    fn construct(_: ()) -> Result<Self, DynError> {
        Ok(DtoMapper {
            marker: NEXT_MARKER.fetch_add(1, Ordering::SeqCst),
            _types: PhantomData,
        })
    }
}

harbor_di::implements!(ProductRepository => dyn Repository<Product>);
harbor_di::implements!(DtoMapper<ProductDto, Product> => dyn Mapper<ProductDto, Product>);

struct UseCase {
    repository: Arc<dyn Repository<Product>>,
    mapper: Arc<dyn Mapper<ProductDto, Product>>,
}

impl UseCase {
    fn create(handle: &DiHandle<'_>) -> Result<Arc<UseCase>, DynError> {
        Ok(Arc::new(UseCase {
            repository: handle.resolve_named::<dyn Repository<Product>>("product")?,
            mapper: handle.resolve_named::<dyn Mapper<ProductDto, Product>>("mapperProductDTO")?,
        }))
    }
}

fn catalog() -> DiContainer {
    let container = DiContainer::new();
    container
        .configure(|c| {
            c.register_named_transient::<dyn Repository<Product>, ProductRepository>("product")?;
            c.register_named_transient::<dyn Mapper<ProductDto, Product>, DtoMapper<ProductDto, Product>>(
                "mapperProductDTO",
            )?;
            c.register_transient_factory::<UseCase, _>(UseCase::create)
        })
        .unwrap();
    container
}

#[test]
fn the_use_case_receives_the_named_registrations() {
    let container = catalog();

    let use_case = container.get_service::<UseCase>().unwrap();
    let repository_marker = use_case.repository.marker();
    let mapper_marker = use_case.mapper.marker();

    assert!(repository_marker >= 100);
    assert!(mapper_marker >= 100);
    assert_ne!(repository_marker, mapper_marker);

    // Transient: another use case gets freshly constructed collaborators
    let other = container.get_service::<UseCase>().unwrap();
    assert!(!Arc::ptr_eq(&use_case, &other));
    assert_ne!(other.repository.marker(), repository_marker);
    assert_ne!(other.mapper.marker(), mapper_marker);

    assert!(container.validate().is_ok());
}

#[test]
fn the_catalog_is_listed() {
    let container = catalog();

    let services = container.list_services();
    let labels = services
        .iter()
        .map(|service| service.key.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        labels,
        vec![
            "UseCase",
            "dyn Mapper<ProductDto, Product>#mapperProductDTO",
            "dyn Repository<Product>#product",
        ]
    );

    assert_eq!(services[0].kind, ServiceKind::Factory);
    assert!(services
        .iter()
        .all(|service| service.lifetime == ServiceLifetime::Transient));
    assert!(matches!(services[2].kind, ServiceKind::Type(info) if info.type_name.ends_with("ProductRepository")));
}
