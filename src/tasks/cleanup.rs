//! Cache Prune Task
//!
//! Background task that periodically drops stale render results.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::render::RenderService;

/// Spawns a background task that periodically prunes old cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between runs, and removes every entry older than `max_age_ms` together
/// with its artifact file.
///
/// # Arguments
/// * `service` - Shared reference to the rendering service
/// * `interval_secs` - Interval in seconds between prune runs
/// * `max_age_ms` - Entries older than this are removed
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let state = AppState::from_config(&config)?;
/// let prune_handle = spawn_prune_task(state.service.clone(), 300, 3_600_000);
/// // Later, during shutdown:
/// prune_handle.abort();
/// ```
pub fn spawn_prune_task(
    service: Arc<RenderService>,
    interval_secs: u64,
    max_age_ms: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache prune task with interval of {} seconds, max age {} ms",
            interval.as_secs(),
            max_age_ms
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = service.prune_expired(max_age_ms).await;

            if removed > 0 {
                info!("Cache prune: removed {} stale entries", removed);
            } else {
                debug!("Cache prune: no stale entries found");
            }
        }
    })
}
