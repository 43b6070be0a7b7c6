//! Idle mount sweeper — unmounts server-side mounts nobody is rendering.
//!
//! DESIGN
//! ======
//! A background task wakes every `MOUNT_SWEEP_INTERVAL_SECS`, removes mounts
//! idle for at least `MOUNT_IDLE_TTL_SECS` from the map, then unmounts them
//! after the lock is released. A TTL of zero disables the sweeper.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

use crate::state::{AppState, MountHandle};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the sweeper loop. Returns `None` when sweeping is disabled.
pub fn spawn_sweeper_task(state: AppState) -> Option<JoinHandle<()>> {
    let ttl = state.config.mount_idle_ttl;
    if ttl.is_zero() {
        info!("idle mount sweeper disabled");
        return None;
    }
    let every = state.config.sweep_interval.max(MIN_SWEEP_INTERVAL);
    info!(ttl_secs = ttl.as_secs(), interval_secs = every.as_secs(), "idle mount sweeper configured");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_idle_mounts(&state, ttl, Instant::now()).await;
        }
    }))
}

/// Remove and unmount every mount idle for at least `ttl` as of `now`.
/// Mounts locked by a request in progress are active and skipped.
/// Returns the number of mounts swept.
pub async fn sweep_idle_mounts(state: &AppState, ttl: Duration, now: Instant) -> usize {
    let expired: Vec<MountHandle> = {
        let mut mounts = state.mounts.lock().await;
        let ids: Vec<Uuid> = mounts
            .iter()
            .filter(|(_, handle)| handle.try_lock().is_ok_and(|mount| mount.idle_for(now) >= ttl))
            .map(|(id, _)| *id)
            .collect();
        ids.iter().filter_map(|id| mounts.remove(id)).collect()
    };

    let swept = expired.len();
    for handle in expired {
        let mut mount = handle.lock().await;
        debug!(mount_id = %mount.id(), widget = %mount.key(), "sweeping idle mount");
        mount.unmount();
    }
    if swept > 0 {
        info!(swept, "idle mounts swept");
    }
    swept
}

#[cfg(test)]
#[path = "sweeper_test.rs"]
mod tests;
