use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::util::{day_identifier, now_millis, MILLIS_PER_DAY};

pub const DEFAULT_THRESHOLD_MS: i64 = 7 * MILLIS_PER_DAY;
pub const DEFAULT_MAX_PER_DAY: u32 = 30;

/// Why `check` refused an account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitViolation {
    AlreadyCreated,
    DailyLimitReached,
}

impl fmt::Display for RateLimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitViolation::AlreadyCreated => {
                write!(f, "It appears that you have already created a free WAX account.")
            }
            RateLimitViolation::DailyLimitReached => {
                write!(f, "Reached the number of free account creations for today.")
            }
        }
    }
}

/// In-memory record of successful account creations.
///
/// `check` and `record` take the lock separately, so two concurrent requests
/// can both pass `check` before either of them records.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<RateLimitState>>,
    threshold_ms: i64,
    max_per_day: u32,
}

struct RateLimitState {
    ip_last_seen: HashMap<String, i64>,
    key_last_seen: HashMap<String, i64>,
    // Holds only the current day; replaced wholesale on rollover.
    day_counter: HashMap<i64, u32>,
}

impl RateLimitState {
    fn new(now: i64) -> Self {
        Self {
            ip_last_seen: HashMap::new(),
            key_last_seen: HashMap::new(),
            day_counter: HashMap::from([(day_identifier(now), 0)]),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_MS, DEFAULT_MAX_PER_DAY)
    }
}

impl RateLimiter {
    pub fn new(threshold_ms: i64, max_per_day: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimitState::new(now_millis()))),
            threshold_ms,
            max_per_day,
        }
    }

    pub async fn check(&self, ips: &[String], keys: &[String]) -> Result<(), RateLimitViolation> {
        self.check_at(ips, keys, now_millis()).await
    }

    pub async fn record(&self, ips: &[String], keys: &[String]) {
        self.record_at(ips, keys, now_millis()).await
    }

    pub async fn check_at(
        &self,
        ips: &[String],
        keys: &[String],
        now: i64,
    ) -> Result<(), RateLimitViolation> {
        let state = self.state.lock().await;
        let within_threshold =
            |last_seen: Option<&i64>| last_seen.is_some_and(|&t| now - t < self.threshold_ms);

        if ips.iter().any(|ip| within_threshold(state.ip_last_seen.get(ip))) {
            return Err(RateLimitViolation::AlreadyCreated);
        }
        if keys.iter().any(|key| within_threshold(state.key_last_seen.get(key))) {
            return Err(RateLimitViolation::AlreadyCreated);
        }

        let today = state
            .day_counter
            .get(&day_identifier(now))
            .copied()
            .unwrap_or(0);
        if today > self.max_per_day {
            return Err(RateLimitViolation::DailyLimitReached);
        }

        Ok(())
    }

    pub async fn record_at(&self, ips: &[String], keys: &[String], now: i64) {
        let mut state = self.state.lock().await;

        for ip in ips {
            state.ip_last_seen.insert(ip.clone(), now);
        }
        for key in keys {
            state.key_last_seen.insert(key.clone(), now);
        }

        let day_id = day_identifier(now);
        if state.day_counter.get(&day_id).copied().unwrap_or(0) == 0 {
            state.day_counter = HashMap::from([(day_id, 0)]);
        }
        if let Some(count) = state.day_counter.get_mut(&day_id) {
            *count += 1;
        }

        tracing::debug!(
            ips = ips.len(),
            keys = keys.len(),
            day_id,
            "Rate limit: creation recorded"
        );
    }

    /// Creations counted for `day_id`; zero for any day other than the live one.
    pub async fn day_count(&self, day_id: i64) -> u32 {
        let state = self.state.lock().await;
        state.day_counter.get(&day_id).copied().unwrap_or(0)
    }

    #[cfg(test)]
    async fn tracked_days(&self) -> usize {
        self.state.lock().await.day_counter.len()
    }
}
