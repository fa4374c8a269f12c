use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::notifier::VerificationNotifier;
use super::service::VerificationService;
use super::store::VerificationStore;

/// Periodically evict expired verifications that nobody touches again.
///
/// Only removes entries that would already fail as expired, so it never changes
/// the outcome of a verify or read. Must be called from within a tokio runtime.
pub fn spawn_sweeper<S, N>(
    service: Arc<VerificationService<S, N>>,
    every: Duration,
) -> JoinHandle<()>
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = service.sweep_expired();
            if evicted > 0 {
                debug!(evicted, remaining = service.pending_count(), "swept expired verifications");
            }
        }
    })
}
