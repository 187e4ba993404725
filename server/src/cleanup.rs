use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{sync::Mutex, time};
use tracing::{debug, info};

use crate::{
    logic::{GameSession, Sessions},
    rate_limit::{RateLimiter, prune_rate_limiter},
};

pub async fn start_cleanup_task(
    sessions: Sessions,
    rate_limiter: RateLimiter,
    interval_secs: u64,
    inactive_timeout_secs: u64,
) {
    let mut interval = time::interval(Duration::from_secs(interval_secs.max(1)));

    info!(
        "Started session cleanup task: checking every {}s, inactive timeout: {}s",
        interval_secs, inactive_timeout_secs
    );

    loop {
        interval.tick().await;
        let now = Instant::now();
        cleanup_sessions(&sessions, inactive_timeout_secs, now);
        prune_rate_limiter(&rate_limiter, now);
    }
}

type Candidate = (String, Arc<Mutex<GameSession>>);

/// Sessions that looked idle as of `now`. Locked sessions are in use and
/// never make the list.
pub fn idle_sessions(
    sessions: &Sessions,
    inactive_timeout_secs: u64,
    now: Instant,
) -> Vec<Candidate> {
    sessions
        .iter()
        .filter(|entry| {
            entry
                .value()
                .try_lock()
                .is_ok_and(|session| session.should_cleanup(inactive_timeout_secs, now))
        })
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect()
}

/// Removes each candidate that is still the stored session and still idle.
/// A session replaced by a restart or touched since it was listed stays.
pub fn evict(
    sessions: &Sessions,
    candidates: Vec<Candidate>,
    inactive_timeout_secs: u64,
    now: Instant,
) -> usize {
    let mut removed = 0;
    for (id, observed) in candidates {
        let evicted = sessions.remove_if(&id, |_, current| {
            Arc::ptr_eq(current, &observed)
                && current
                    .try_lock()
                    .is_ok_and(|session| session.should_cleanup(inactive_timeout_secs, now))
        });
        if evicted.is_some() {
            debug!("Cleaned up session: {}", id);
            removed += 1;
        } else {
            debug!("Session {} became active again, keeping it", id);
        }
    }
    removed
}

/// Removes sessions idle for longer than the timeout as of `now`. Returns
/// how many were removed.
pub fn cleanup_sessions(sessions: &Sessions, inactive_timeout_secs: u64, now: Instant) -> usize {
    let candidates = idle_sessions(sessions, inactive_timeout_secs, now);
    let removed = evict(sessions, candidates, inactive_timeout_secs, now);

    if removed > 0 {
        info!("Cleaned up {} inactive sessions", removed);
    }
    removed
}
