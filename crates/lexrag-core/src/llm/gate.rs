//! Admission gate limiting concurrent model calls

use crate::cancel::{cancellable, CancellationToken};
use crate::error::{LexRagError, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting gate shared by every `generate` call of one adapter
///
/// Cloning shares the underlying permits. Construct one per adapter (or
/// share one deliberately across adapters that hit the same runtime).
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Held for the duration of one admitted call; released on drop
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Create a gate admitting `capacity` concurrent calls (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a slot; cancellation while queued returns `Cancelled`
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<AdmissionPermit> {
        let semaphore = self.semaphore.clone();
        let permit = cancellable(cancel, async move {
            semaphore
                .acquire_owned()
                .await
                .map_err(|e| LexRagError::Other(anyhow::anyhow!("admission gate closed: {}", e)))
        })
        .await?;
        Ok(AdmissionPermit { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots free right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(1)
    }
}
