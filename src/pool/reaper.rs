//! Background sweep over the connection pool.
//!
//! The original ran idle-eviction and health-recheck as an if/elif pair, so
//! a connection that was both idle and overdue for a health check only ever
//! got the idle branch — the health check silently never ran for anything
//! that also happened to be idle. The two are independent concerns (a
//! connection can be busy and unhealthy, or idle and perfectly fine) so this
//! evaluates them as two separate checks per entry.

use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;

use super::{HEALTH_RECHECK_AFTER, IDLE_EVICT_AFTER, cache, is_alive};

const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Spawns the reaper as a detached background task, swept every 5 minutes.
pub fn spawn_reaper() -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sweep_once().await;
        }
    })
}

async fn sweep_once() {
    let entries: Vec<_> = cache()
        .iter()
        .map(|(key, entry)| ((*key).clone(), entry))
        .collect();

    for (key, entry) in entries {
        if entry.idle_for().await >= IDLE_EVICT_AFTER {
            debug!("reaper: evicting idle connection {key}");
            cache().invalidate(&key).await;
            continue;
        }

        if entry.since_last_health_check().await >= HEALTH_RECHECK_AFTER {
            if is_alive(&entry.session).await {
                entry.mark_health_checked().await;
            } else {
                warn!("reaper: evicting unhealthy connection {key}");
                cache().invalidate(&key).await;
            }
        }
    }
}
