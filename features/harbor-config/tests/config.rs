use std::sync::Arc;

use harbor_config::{config::Config, provider::ConfigProvider};
use harbor_di::{Construct, DiContainer, DiError, DynError};

#[derive(Debug)]
struct PricingConfig {
    currency: &'static str,
    vat_percent: u32,
}

struct FeatureFlags;

struct PriceFormatter {
    config: Config<PricingConfig>,
}

impl Construct for PriceFormatter {
    type Dependencies = Config<PricingConfig>;

    fn construct(config: Config<PricingConfig>) -> Result<Self, DynError> {
        Ok(PriceFormatter { config })
    }
}

impl PriceFormatter {
    fn format(&self, cents: u32) -> String {
        let gross = cents * (100 + self.config.vat_percent) / 100;
        format!("{}.{:02} {}", gross / 100, gross % 100, self.config.currency)
    }
}

struct FlaggedService;

impl Construct for FlaggedService {
    type Dependencies = Config<FeatureFlags>;

    fn construct(_: Config<FeatureFlags>) -> Result<Self, DynError> {
        Ok(FlaggedService)
    }
}

struct OptionalFlags {
    flags: Option<Config<FeatureFlags>>,
}

impl Construct for OptionalFlags {
    type Dependencies = Option<Config<FeatureFlags>>;

    fn construct(flags: Option<Config<FeatureFlags>>) -> Result<Self, DynError> {
        Ok(OptionalFlags { flags })
    }
}

fn container_with(provider: ConfigProvider) -> DiContainer {
    let container = DiContainer::new();
    container
        .configure(|c| {
            provider.install(c)?;
            c.register_singleton::<PriceFormatter, PriceFormatter>()?;
            c.register_transient::<FlaggedService, FlaggedService>()?;
            c.register_transient::<OptionalFlags, OptionalFlags>()
        })
        .unwrap();
    container
}

#[test]
fn configs_are_injected() {
    let mut provider = ConfigProvider::new();
    provider
        .add_config(PricingConfig {
            currency: "EUR",
            vat_percent: 20,
        })
        .unwrap();
    let container = container_with(provider);

    let formatter = container.get_service::<PriceFormatter>().unwrap();
    assert_eq!(formatter.format(1000), "12.00 EUR");

    // The provider itself is a singleton
    let a = container.get_service::<ConfigProvider>().unwrap();
    let b = container.get_service::<ConfigProvider>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn missing_configs_fail_resolution() {
    let container = container_with(ConfigProvider::new());

    let error = container.get_service::<FlaggedService>().err().unwrap();
    assert!(matches!(error, DiError::ServiceNotFound(key) if key.label().contains("Config<FeatureFlags>")));
}

#[test]
fn missing_provider_is_reported_by_validation() {
    let container = DiContainer::new();
    container
        .configure(|c| c.register_singleton::<PriceFormatter, PriceFormatter>())
        .unwrap();

    assert!(container.validate().is_err());
    assert!(matches!(
        container.get_service::<PriceFormatter>(),
        Err(DiError::ServiceNotFound(_))
    ));
}

#[test]
fn optional_configs_are_none_when_missing() {
    let container = container_with(ConfigProvider::new());
    let service = container.get_service::<OptionalFlags>().unwrap();
    assert!(service.flags.is_none());

    let mut provider = ConfigProvider::new();
    provider.add_config(FeatureFlags).unwrap();
    let container = container_with(provider);
    let service = container.get_service::<OptionalFlags>().unwrap();
    assert!(service.flags.is_some());
}

#[test]
fn optional_configs_are_none_without_provider() {
    let container = DiContainer::new();
    container
        .configure(|c| c.register_transient::<OptionalFlags, OptionalFlags>())
        .unwrap();

    assert!(container.validate().is_ok());
    let service = container.get_service::<OptionalFlags>().unwrap();
    assert!(service.flags.is_none());
}
