//! Process-wide single-flight guard.
//!
//! At most one operation of each kind runs at a time. A second request while
//! one is outstanding is rejected, not queued.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

use crate::errors::AppError;

#[derive(Clone)]
pub struct SingleFlight {
    operation: &'static str,
    slot: Arc<Semaphore>,
}

impl SingleFlight {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Claims the slot for the lifetime of the returned permit.
    pub fn try_begin(&self) -> Result<OwnedSemaphorePermit, AppError> {
        Arc::clone(&self.slot).try_acquire_owned().map_err(|_| {
            warn!("Rejected concurrent {} request", self.operation);
            AppError::Busy(self.operation)
        })
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.slot.available_permits() == 1
    }
}
