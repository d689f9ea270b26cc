use crate::{errors::DiError, handle::DiHandle, resolver::Resolver, types::DependencyInfo};

impl Resolver for () {
    #[inline]
    fn resolve(_: &DiHandle<'_>) -> Result<Self, DiError> {
        Ok(())
    }

    fn dependency_info() -> Vec<DependencyInfo> {
        Vec::new()
    }
}

macro_rules! define_tuple_resolver {
    ($($T: ident),+) => {
        impl<$($T: Resolver),+> Resolver for ($($T,)+) {
            #[inline]
            fn resolve(handle: &DiHandle<'_>) -> Result<Self, DiError> {
                let tuple = (
                    $(
                    $T::resolve(handle)?,
                    )+
                );
                Ok(tuple)
            }

            fn dependency_info() -> Vec<DependencyInfo> {
                let mut dependencies = Vec::new();
                $(
                dependencies.extend($T::dependency_info());
                )+
                dependencies
            }
        }
    }
}

define_tuple_resolver! { T1 }
define_tuple_resolver! { T1, T2 }
define_tuple_resolver! { T1, T2, T3 }
define_tuple_resolver! { T1, T2, T3, T4 }
define_tuple_resolver! { T1, T2, T3, T4, T5 }
define_tuple_resolver! { T1, T2, T3, T4, T5, T6 }
define_tuple_resolver! { T1, T2, T3, T4, T5, T6, T7 }
define_tuple_resolver! { T1, T2, T3, T4, T5, T6, T7, T8 }
