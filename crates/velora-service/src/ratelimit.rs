//! Per-user rate limiting for paid AI endpoints.
//!
//! Sliding fixed window: the first request in a window starts a fresh
//! counter; requests increment it until the limit; the counter resets once
//! the window elapses. This is an abuse-mitigation control, not a billing
//! control: state is process-local and lost on restart, which at worst
//! briefly relaxes throttling. Billing correctness lives in the ledger.
//!
//! The window state sits behind [`RateLimitStore`] so a distributed cache
//! can replace the in-memory map without touching call sites.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use velora_core::UserId;

/// A single user's request window.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Storage for rate-limit windows.
///
/// `admit` must be atomic per user: the check and the increment happen as
/// one operation.
pub trait RateLimitStore: Send + Sync {
    /// Record a request at `now` and report whether it is admitted.
    fn admit(&self, user_id: &UserId, limit: u32, window: Duration, now: Instant) -> bool;
}

/// In-memory window store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<UserId, Window>>,
}

impl InMemoryRateLimitStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn admit(&self, user_id: &UserId, limit: u32, window: Duration, now: Instant) -> bool {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match windows.get_mut(user_id) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= limit {
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                windows.insert(
                    *user_id,
                    Window {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                true
            }
        }
    }
}

/// Per-user request throttle for paid endpoints.
pub struct RateLimiter {
    store: Box<dyn RateLimitStore>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    /// Create a rate limiter over the given store.
    #[must_use]
    pub fn new(store: Box<dyn RateLimitStore>, limit: u32, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    /// Create a rate limiter with the in-memory store.
    #[must_use]
    pub fn in_memory(limit: u32, window: Duration) -> Self {
        Self::new(Box::new(InMemoryRateLimitStore::new()), limit, window)
    }

    /// Admit or reject a request for this user. Rejection mutates nothing
    /// beyond the window counter and never touches the ledger.
    #[must_use]
    pub fn admit(&self, user_id: &UserId) -> bool {
        self.admit_at(user_id, Instant::now())
    }

    /// Admit or reject at an explicit instant (deterministic testing).
    #[must_use]
    pub fn admit_at(&self, user_id: &UserId, now: Instant) -> bool {
        self.store.admit(user_id, self.limit, self.window, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let limiter = RateLimiter::in_memory(5, WINDOW);
        let user_id = UserId::generate();
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.admit_at(&user_id, now));
        }
        assert!(!limiter.admit_at(&user_id, now));
    }

    #[test]
    fn window_elapse_resets_the_counter() {
        let limiter = RateLimiter::in_memory(5, WINDOW);
        let user_id = UserId::generate();
        let start = Instant::now();

        for _ in 0..5 {
            assert!(limiter.admit_at(&user_id, start));
        }
        assert!(!limiter.admit_at(&user_id, start));

        let later = start + WINDOW + Duration::from_millis(1);
        assert!(limiter.admit_at(&user_id, later));
    }

    #[test]
    fn users_are_throttled_independently() {
        let limiter = RateLimiter::in_memory(1, WINDOW);
        let alice = UserId::generate();
        let bob = UserId::generate();
        let now = Instant::now();

        assert!(limiter.admit_at(&alice, now));
        assert!(!limiter.admit_at(&alice, now));
        assert!(limiter.admit_at(&bob, now));
    }
}
