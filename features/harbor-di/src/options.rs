use crate::key::KeyStrategy;

/// Options of a [`DiContainer`](crate::DiContainer), fixed at creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiOptions {
    /// How service keys are derived from contract types
    pub key_strategy: KeyStrategy,
}

impl DiOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_strategy(mut self, key_strategy: KeyStrategy) -> Self {
        self.key_strategy = key_strategy;
        self
    }
}
