use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::MediaUri;

use super::timer::TaskHandle;
use crate::media::MediaGateway;

/// Coalesces rapid prefetch requests: each request replaces the pending one,
/// and only a request that survives `delay` reaches the gateway.
pub struct PrefetchDebouncer {
    gateway: Arc<dyn MediaGateway>,
    delay: Duration,
    pending: TaskHandle,
}

impl PrefetchDebouncer {
    #[must_use]
    pub fn new(gateway: Arc<dyn MediaGateway>, delay: Duration) -> Self {
        Self {
            gateway,
            delay,
            pending: TaskHandle::default(),
        }
    }

    /// Schedule a prefetch of `uri`, cancelling any pending one.
    pub fn request(&mut self, uri: MediaUri) {
        self.pending.cancel();
        let gateway = Arc::clone(&self.gateway);
        let delay = self.delay;
        self.pending = TaskHandle::new(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = gateway.prefetch(&uri).await {
                log::warn!("prefetch of {uri} failed: {err}");
            }
        }));
    }

    /// Drop the pending request, if any.
    pub fn cancel(&mut self) {
        self.pending.cancel();
    }
}
