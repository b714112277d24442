//! Short-lived memory of client-supplied request keys.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const MIN_IDEMPOTENCY_TTL: Duration = Duration::from_secs(1);
pub const MAX_IDEMPOTENCY_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// Expired keys are swept on every this-many claims.
const PURGE_EVERY: u64 = 256;

#[derive(Debug, Clone)]
pub struct IdempotencyStore {
    seen: Arc<DashMap<String, Instant>>,
    claims: Arc<AtomicU64>,
    ttl: Duration,
    purge_every: u64,
}

impl IdempotencyStore {
    /// `ttl` is clamped to `MIN_IDEMPOTENCY_TTL..=MAX_IDEMPOTENCY_TTL`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            seen: Arc::new(DashMap::new()),
            claims: Arc::new(AtomicU64::new(0)),
            ttl: ttl.clamp(MIN_IDEMPOTENCY_TTL, MAX_IDEMPOTENCY_TTL),
            purge_every: PURGE_EVERY,
        }
    }

    #[cfg(test)]
    fn with_purge_every(mut self, purge_every: u64) -> Self {
        self.purge_every = purge_every.max(1);
        self
    }

    /// Records `key` under `scope`. Returns false if the same key was claimed
    /// within the TTL.
    pub fn claim(&self, scope: &str, key: &str) -> bool {
        let now = Instant::now();
        let claimed = match self.seen.entry(entry_key(scope, key)) {
            Entry::Occupied(mut existing) => {
                if *existing.get() > now {
                    false
                } else {
                    existing.insert(now + self.ttl);
                    true
                }
            }
            Entry::Vacant(free) => {
                free.insert(now + self.ttl);
                true
            }
        };

        if (self.claims.fetch_add(1, Ordering::Relaxed) + 1) % self.purge_every == 0 {
            let purged = self.purge_expired();
            debug!(purged, "Swept expired request keys");
        }
        claimed
    }

    /// Gives up a claim whose request did not go through, so a retry with
    /// the same key is accepted.
    pub fn forget(&self, scope: &str, key: &str) {
        self.seen.remove(&entry_key(scope, key));
    }

    /// Drops expired keys; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.seen.len();
        self.seen.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.seen.len())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn entry_key(scope: &str, key: &str) -> String {
    format!("idempotency:{scope}:{key}")
}
