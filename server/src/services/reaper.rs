//! Reaper service: background eviction of idle editor sessions.
//!
//! DESIGN
//! ======
//! One task ticks at the configured interval and evicts every session idle
//! for at least the session TTL. Missed ticks are delayed, not bunched.

use std::time::Instant;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::services::session;
use crate::state::AppState;

/// Spawn the background reaper task. Returns a handle for shutdown.
pub fn spawn_reaper_task(state: AppState) -> JoinHandle<()> {
    let interval = state.config.reaper_interval;
    info!(
        interval_secs = interval.as_secs(),
        ttl_secs = state.config.session_ttl.as_secs(),
        "session reaper configured"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = session::evict_idle(&state, Instant::now()).await;
            if evicted > 0 {
                info!(evicted, "idle editor sessions evicted");
            } else {
                debug!("no idle editor sessions");
            }
        }
    })
}

#[cfg(test)]
#[path = "reaper_test.rs"]
mod tests;
