// deplist-core/src/limiter.rs
// Counting admission gate for metadata resolution. Each resolution may hold
// several file descriptors open, so the number in flight is capped.

use std::sync::Arc;

use deplist_common::error::{DeplistError, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default ceiling on concurrent resolutions.
pub const DEFAULT_MAX_INFLIGHT: usize = 128;

#[derive(Debug, Clone)]
pub struct Limiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One admitted slot. Dropping it releases the slot.
#[derive(Debug)]
pub struct LimiterPermit {
    _permit: OwnedSemaphorePermit,
}

impl Limiter {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DeplistError::Config(
                "resolution limit must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    /// Waits until fewer than `capacity` slots are held. Waiters are not
    /// admitted in any particular order.
    pub async fn acquire(&self) -> Result<LimiterPermit> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| DeplistError::Generic("resolution limiter closed".to_string()))?;
        Ok(LimiterPermit { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_INFLIGHT)),
            capacity: DEFAULT_MAX_INFLIGHT,
        }
    }
}
