//! Dispatch throttle
//!
//! Two limits apply to every request, regardless of stage:
//! - At most `max_concurrent_requests` requests are in flight
//! - Consecutive dispatches are at least `request_delay` apart

use crate::config::CrawlerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep_until, Instant};

/// A dispatch slot; the request counts as in flight until this is dropped
pub struct DispatchPermit {
    _permit: OwnedSemaphorePermit,
}

/// Global rate and concurrency limiter shared by all in-flight targets
pub struct Throttle {
    delay: Duration,
    permits: Arc<Semaphore>,
    next_dispatch: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration, max_concurrent: usize) -> Self {
        Self {
            delay,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            next_dispatch: Mutex::new(None),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.request_delay(),
            config.max_concurrent_requests as usize,
        )
    }

    /// Waits for a free slot, then for the next dispatch time
    ///
    /// The dispatch-time lock is held while sleeping so waiters are released
    /// one delay apart, in arrival order.
    pub async fn acquire(&self) -> Option<DispatchPermit> {
        let permit = self.permits.clone().acquire_owned().await.ok()?;

        let mut next_dispatch = self.next_dispatch.lock().await;
        if let Some(at) = *next_dispatch {
            sleep_until(at).await;
        }
        *next_dispatch = Some(Instant::now() + self.delay);

        Some(DispatchPermit { _permit: permit })
    }
}
