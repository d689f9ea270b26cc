//! Property-based tests for keys, lifetimes and generic descriptors

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use harbor_di::{DiContainer, GenericTypeDescriptor, KeyStrategy, ServiceKey};
use proptest::prelude::*;

struct Widget(usize);

fn arb_descriptor() -> impl Strategy<Value = GenericTypeDescriptor> {
    let leaf = "[A-Z][a-z]{0,6}".prop_map(|raw: String| GenericTypeDescriptor::leaf(raw));
    leaf.prop_recursive(3, 16, 3, |inner| {
        ("[A-Z][a-z]{0,6}", prop::collection::vec(inner, 1..4))
            .prop_map(|(raw_type, arguments)| GenericTypeDescriptor::new(raw_type, arguments))
    })
}

proptest! {
    #[test]
    fn keys_are_equal_exactly_when_names_are(a in "[a-z]{0,4}", b in "[a-z]{0,4}") {
        for strategy in [KeyStrategy::Reified, KeyStrategy::Erased] {
            let left = ServiceKey::of::<Widget>(strategy, &a);
            let right = ServiceKey::of::<Widget>(strategy, &b);
            prop_assert_eq!(left == right, a == b);
        }
    }

    #[test]
    fn lifetimes_decide_how_often_factories_run(resolutions in 1usize..20) {
        let transient = Arc::new(AtomicUsize::new(0));
        let singleton = Arc::new(AtomicUsize::new(0));

        let container = DiContainer::new();
        container
            .configure(|c| {
                let transient = transient.clone();
                c.register_named_transient_factory::<Widget, _>("transient", move |_| {
                    Ok(Arc::new(Widget(transient.fetch_add(1, Ordering::SeqCst))))
                })?;
                let singleton = singleton.clone();
                c.register_named_singleton_factory::<Widget, _>("singleton", move |_| {
                    Ok(Arc::new(Widget(singleton.fetch_add(1, Ordering::SeqCst))))
                })
            })
            .unwrap();

        for _ in 0..resolutions {
            container.get_named_service::<Widget>("transient").unwrap();
            prop_assert_eq!(container.get_named_service::<Widget>("singleton").unwrap().0, 0);
        }

        prop_assert_eq!(transient.load(Ordering::SeqCst), resolutions);
        prop_assert_eq!(singleton.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn the_last_registration_wins(values in prop::collection::vec(any::<usize>(), 1..8)) {
        let container = DiContainer::new();
        for value in &values {
            container
                .configure(|c| c.register_instance::<Widget>("", Arc::new(Widget(*value))))
                .unwrap();
        }

        prop_assert_eq!(container.len(), 1);
        prop_assert_eq!(container.get_service::<Widget>().unwrap().0, *values.last().unwrap());
    }

    #[test]
    fn descriptors_parse_what_they_display(descriptor in arb_descriptor()) {
        let parsed = GenericTypeDescriptor::parse(&descriptor.to_string()).unwrap();

        prop_assert!(parsed.matches(&descriptor));
        prop_assert_eq!(parsed.raw_simple_name(), descriptor.raw_simple_name());
    }

    #[test]
    fn unbalanced_names_are_rejected(raw in "[A-Z][a-z]{0,6}", depth in 1usize..4) {
        let text = format!("{raw}{}", "<Item".repeat(depth));
        prop_assert!(GenericTypeDescriptor::parse(&text).is_err());
    }
}
