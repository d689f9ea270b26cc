//! Service keys, the identity a registration is stored and looked up under

use std::{any::TypeId, fmt::Display};

use crate::types::TypeInfo;

/// How the contract part of a [`ServiceKey`] is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyStrategy {
    /// The full type identity, `Repository<Product>` and `Repository<Order>` are different keys
    #[default]
    Reified,
    /// Only the simple raw name of the type, generic arguments and module paths are dropped.
    ///
    /// `Repository<Product>` and `Repository<Order>` collide, as do equally named types
    /// from different modules.
    Erased,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Contract {
    Reified(TypeId),
    Erased(String),
}

/// Identity of a registration: the abstract contract plus an optional name.
///
/// An empty name is the default registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    contract: Contract,
    label: String,
    name: String,
}

impl ServiceKey {
    pub fn of<T: ?Sized + 'static>(strategy: KeyStrategy, name: &str) -> Self {
        Self::from_type_info(TypeInfo::of::<T>(), strategy, name)
    }

    pub fn from_type_info(info: TypeInfo, strategy: KeyStrategy, name: &str) -> Self {
        match strategy {
            KeyStrategy::Reified => ServiceKey {
                contract: Contract::Reified(info.type_id),
                label: simple_name(info.type_name),
                name: name.to_owned(),
            },
            KeyStrategy::Erased => Self::erased(raw_simple_name(info.type_name), name),
        }
    }

    pub(crate) fn erased(raw_name: String, name: &str) -> Self {
        ServiceKey {
            contract: Contract::Erased(raw_name.clone()),
            label: raw_name,
            name: name.to_owned(),
        }
    }

    /// The registration name, empty for the default registration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Simple name of the contract, without module paths
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }
}

impl Display for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.label)
        } else {
            write!(f, "{}#{}", self.label, self.name)
        }
    }
}

/// Strips module paths from every path inside a type name
///
/// `alloc::sync::Arc<dyn app::Repository<app::Product>>` becomes `Arc<dyn Repository<Product>>`
pub fn simple_name(type_name: &str) -> String {
    let mut simple = String::with_capacity(type_name.len());
    let mut segment_start = 0;
    let mut chars = type_name.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            simple.truncate(segment_start);
            continue;
        }

        simple.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment_start = simple.len();
        }
    }

    simple
}

/// The simple name of the outermost type, without `dyn` and generic arguments
pub fn raw_simple_name(type_name: &str) -> String {
    let simple = simple_name(type_name);
    let simple = simple.strip_prefix("dyn ").unwrap_or(&simple);
    let end = simple.find(['<', ' ']).unwrap_or(simple.len());
    simple[..end].to_owned()
}
