use std::{
    net::IpAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use rocket::request::{self, FromRequest, Request};
use tracing::{debug, info, instrument, warn};

/// Length of one quota window; a client's allowance resets after it.
pub const QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Games a client has started in the current window.
#[derive(Debug)]
pub struct ClientQuota {
    window_start: Instant,
    used: u32,
}

impl ClientQuota {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            used: 0,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.window_start) >= QUOTA_WINDOW
    }

    fn try_acquire(&mut self, capacity: u32, now: Instant) -> bool {
        if self.is_expired(now) {
            debug!("Quota window expired after {} games, resetting", self.used);
            *self = Self::new(now);
        }
        if self.used < capacity {
            self.used += 1;
            true
        } else {
            false
        }
    }
}

pub type RateLimiter = Arc<DashMap<IpAddr, ClientQuota>>;

pub fn create_rate_limiter() -> RateLimiter {
    Arc::new(DashMap::new())
}

#[derive(Debug)]
pub struct ClientIp(pub IpAddr);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let ip = req
            .headers()
            .get_one("X-Forwarded-For")
            .and_then(|header| header.split(',').next())
            .and_then(|ip| ip.trim().parse().ok())
            .or_else(|| {
                req.headers()
                    .get_one("X-Real-IP")
                    .and_then(|ip| ip.parse().ok())
            })
            .or_else(|| req.client_ip())
            .unwrap_or(IpAddr::from([127, 0, 0, 1]));

        request::Outcome::Success(ClientIp(ip))
    }
}

/// Counts one game start for `ip`, allowing `capacity` per window.
/// Returns `false` when the client is over its limit.
#[instrument(level = "trace", skip(rate_limiter))]
pub fn check_rate_limit(rate_limiter: &RateLimiter, ip: &IpAddr, capacity: u32) -> bool {
    let now = Instant::now();
    let mut quota = rate_limiter
        .entry(*ip)
        .or_insert_with(|| ClientQuota::new(now));

    if quota.try_acquire(capacity, now) {
        debug!("Rate limit check passed for {} ({} used)", ip, quota.used);
        true
    } else {
        warn!("Rate limit exceeded for {} - rejecting request", ip);
        false
    }
}

/// Drops quotas whose window has ended as of `now`. A dropped client starts
/// over with a full allowance, same as an expired window.
pub fn prune_rate_limiter(rate_limiter: &RateLimiter, now: Instant) -> usize {
    let before = rate_limiter.len();
    rate_limiter.retain(|_, quota| !quota.is_expired(now));
    let pruned = before.saturating_sub(rate_limiter.len());
    if pruned > 0 {
        info!("Pruned {} expired rate limit entries", pruned);
    }
    pruned
}
