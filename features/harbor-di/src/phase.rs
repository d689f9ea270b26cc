use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
    thread::{self, ThreadId},
};

use crate::errors::DiError;

/// Tracks which threads are currently inside `configure`.
///
/// Reentrancy is detected per thread. Two threads configuring at the same time are
/// only kept apart by the registry lock.
#[derive(Default)]
pub(crate) struct ConfigurationPhase {
    active: Mutex<HashSet<ThreadId>>,
}

impl ConfigurationPhase {
    /// Opens the phase for the current thread until the guard is dropped
    pub(crate) fn open(&self) -> Result<PhaseGuard<'_>, DiError> {
        let thread = thread::current().id();
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        if !active.insert(thread) {
            tracing::error!("Reentrant configuration detected");
            return Err(DiError::ConfigurationState(
                "cannot configure services recursively",
            ));
        }

        tracing::debug!("Configuration phase opened");
        Ok(PhaseGuard { phase: self, thread })
    }

    pub(crate) fn ensure_open(&self) -> Result<(), DiError> {
        if self.is_open() {
            return Ok(());
        }

        tracing::error!("Registration outside of configuration block is not allowed");
        Err(DiError::ConfigurationState(
            "registration must occur within a configuration block",
        ))
    }

    pub(crate) fn is_open(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&thread::current().id())
    }
}

/// Closes the phase on drop, also when the configuration action failed or panicked
pub(crate) struct PhaseGuard<'a> {
    phase: &'a ConfigurationPhase,
    thread: ThreadId,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.thread);
        tracing::debug!("Configuration phase closed");
    }
}
