use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{
    container::DiContainer,
    errors::format_chain,
    key::ServiceKey,
    types::{DependencyInfo, TypeInfo},
};

/// Graph of all registrations of a container
/// Used to check missing and circular dependencies before anything is built
pub struct DependencyGraph {
    map: HashMap<ServiceKey, DependencyGraphEntry>,
    /// Keys in display order, so errors are reported deterministically
    order: Vec<ServiceKey>,
}

impl DependencyGraph {
    pub fn new(container: &DiContainer) -> Self {
        let mut graph = Self {
            map: Default::default(),
            order: Vec::new(),
        };

        for service in container.list_services() {
            let dependencies = service
                .dependencies
                .into_iter()
                .map(|info| (container.key_for_info(info.type_info, ""), info))
                .collect();

            // list_services is sorted by display name
            graph.order.push(service.key.clone());
            graph.map.insert(
                service.key.clone(),
                DependencyGraphEntry {
                    key: service.key,
                    info: service.contract,
                    dependencies,
                },
            );
        }

        graph
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for entry in self.order.iter().filter_map(|key| self.map.get(key)) {
            let mut dependency_chain = Vec::new();
            check_recurse(
                self,
                &mut checked,
                &mut errors,
                &mut dependency_chain,
                entry,
            );
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse<'g>(
            graph: &'g DependencyGraph,
            checked: &mut HashSet<&'g ServiceKey>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<&'g ServiceKey>,
            entry: &'g DependencyGraphEntry,
        ) {
            // Circular Dependency Check
            if let Some(start) = dependency_chain.iter().position(|key| *key == &entry.key) {
                let mut chain: Vec<ServiceKey> =
                    dependency_chain[start..].iter().map(|key| (*key).clone()).collect();
                chain.push(entry.key.clone());

                errors.push(DependencyGraphError::CircularDependency {
                    from: dependency_chain[start].clone(),
                    to: dependency_chain[dependency_chain.len() - 1].clone(),
                    chain,
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(&entry.key) {
                return;
            };

            dependency_chain.push(&entry.key);

            for (key, dependency) in &entry.dependencies {
                let Some(next_entry) = graph.map.get(key) else {
                    if !dependency.optional {
                        errors.push(DependencyGraphError::MissingDependency {
                            dependency: dependency.type_info,
                            required_by: entry.info,
                        });
                    }

                    continue;
                };

                if dependency.lazy {
                    // Resolved in its own chain on first access, checked by itself
                    continue;
                }

                check_recurse(graph, checked, errors, dependency_chain, next_entry);
            }

            dependency_chain.pop();
        }
    }

    /// Number of registrations in the graph
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

struct DependencyGraphEntry {
    key: ServiceKey,
    info: TypeInfo,
    dependencies: Vec<(ServiceKey, DependencyInfo)>,
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: TypeInfo,
        required_by: TypeInfo,
    },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {} - Consider using `Lazy`", format_chain(.chain))]
    CircularDependency {
        from: ServiceKey,
        to: ServiceKey,
        chain: Vec<ServiceKey>,
    },
}

impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{factories::Construct, resolver::lazy::Lazy, types::DynError};

    struct Engine {
        _wheels: Arc<Wheels>,
    }
    struct Wheels {
        _engine: Arc<Engine>,
    }
    struct Starter {
        _wheels: Arc<LazyWheels>,
    }
    struct LazyWheels {
        _starter: Lazy<Starter>,
    }
    struct Radio;
    struct Dashboard {
        _radio: Option<Arc<Radio>>,
    }

    impl Construct for Engine {
        type Dependencies = Arc<Wheels>;
        fn construct(wheels: Arc<Wheels>) -> Result<Self, DynError> {
            Ok(Engine { _wheels: wheels })
        }
    }
    impl Construct for Wheels {
        type Dependencies = Arc<Engine>;
        fn construct(engine: Arc<Engine>) -> Result<Self, DynError> {
            Ok(Wheels { _engine: engine })
        }
    }
    impl Construct for Starter {
        type Dependencies = Arc<LazyWheels>;
        fn construct(wheels: Arc<LazyWheels>) -> Result<Self, DynError> {
            Ok(Starter { _wheels: wheels })
        }
    }
    impl Construct for LazyWheels {
        type Dependencies = Lazy<Starter>;
        fn construct(starter: Lazy<Starter>) -> Result<Self, DynError> {
            Ok(LazyWheels { _starter: starter })
        }
    }
    impl Construct for Dashboard {
        type Dependencies = Option<Arc<Radio>>;
        fn construct(radio: Option<Arc<Radio>>) -> Result<Self, DynError> {
            Ok(Dashboard { _radio: radio })
        }
    }

    #[test]
    fn it_finds_cycles() {
        let container = DiContainer::new();
        container
            .configure(|c| {
                c.register_singleton::<Engine, Engine>()?;
                c.register_singleton::<Wheels, Wheels>()
            })
            .unwrap();

        let errors = container.validate().unwrap_err().errors;
        assert_eq!(errors.len(), 1);
        let DependencyGraphError::CircularDependency { chain, .. } = &errors[0] else {
            panic!("expected a circular dependency, got {errors:?}");
        };
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.first(), chain.last());
    }

    #[test]
    fn it_reports_missing_dependencies() {
        let container = DiContainer::new();
        container
            .configure(|c| c.register_transient::<Wheels, Wheels>())
            .unwrap();

        let errors = container.validate().unwrap_err().errors;
        assert!(matches!(
            errors.as_slice(),
            [DependencyGraphError::MissingDependency { dependency, .. }]
                if *dependency == TypeInfo::of::<Engine>()
        ));
    }

    #[test]
    fn lazy_and_optional_edges_are_fine() {
        let container = DiContainer::new();
        container
            .configure(|c| {
                c.register_singleton::<Starter, Starter>()?;
                c.register_singleton::<LazyWheels, LazyWheels>()?;
                c.register_transient::<Dashboard, Dashboard>()
            })
            .unwrap();

        // Starter -> LazyWheels is a plain edge, the way back is lazy
        let graph = DependencyGraph::new(&container);
        assert_eq!(graph.len(), 3);
        assert!(graph.check().is_ok());
    }

    #[test]
    fn factories_are_leaves() {
        let container = DiContainer::new();
        container
            .configure(|c| {
                c.register_singleton::<Engine, Engine>()?;
                c.register_singleton_factory::<Wheels, _>(|h| {
                    Ok(Arc::new(Wheels {
                        _engine: h.resolve::<Engine>()?,
                    }))
                })
            })
            .unwrap();

        // The cycle only shows up at resolution time
        assert!(container.validate().is_ok());
    }

    mod orders {
        use super::*;

        pub struct Product;

        pub struct Ledger {
            _stock: Arc<super::inventory::Ledger>,
        }
        impl Construct for Ledger {
            type Dependencies = Arc<super::inventory::Ledger>;
            fn construct(stock: Self::Dependencies) -> Result<Self, DynError> {
                Ok(Ledger { _stock: stock })
            }
        }
    }

    mod inventory {
        use super::*;

        pub struct Product;

        pub struct Ledger {
            _orders: Arc<super::orders::Ledger>,
        }
        impl Construct for Ledger {
            type Dependencies = Arc<super::orders::Ledger>;
            fn construct(orders: Self::Dependencies) -> Result<Self, DynError> {
                Ok(Ledger { _orders: orders })
            }
        }
    }

    struct Invoice {
        _product: Arc<orders::Product>,
    }
    impl Construct for Invoice {
        type Dependencies = Arc<orders::Product>;
        fn construct(product: Arc<orders::Product>) -> Result<Self, DynError> {
            Ok(Invoice { _product: product })
        }
    }

    #[test]
    fn equally_named_types_stay_apart() {
        let container = DiContainer::new();
        container
            .configure(|c| {
                c.register_instance::<orders::Product>("", Arc::new(orders::Product))?;
                c.register_instance::<inventory::Product>("", Arc::new(inventory::Product))?;
                c.register_transient::<Invoice, Invoice>()
            })
            .unwrap();

        assert_eq!(DependencyGraph::new(&container).len(), 3);
        assert!(container.validate().is_ok());
        assert!(container.get_service::<Invoice>().is_ok());
    }

    #[test]
    fn cycles_between_equally_named_types_are_found() {
        let container = DiContainer::new();
        container
            .configure(|c| {
                c.register_transient::<orders::Ledger, orders::Ledger>()?;
                c.register_transient::<inventory::Ledger, inventory::Ledger>()
            })
            .unwrap();

        let errors = container.validate().unwrap_err().errors;
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            DependencyGraphError::CircularDependency { chain, .. } if chain.len() == 3
        ));
    }
}
