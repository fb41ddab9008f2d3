//! Fixed-Window Rate Limiter
//!
//! Counter-with-expiry per client key. The first hit in a window starts it
//! (sets the TTL); every hit increments; hits beyond `max_requests` are
//! refused until the window expires.
//!
//! Backing stores:
//! - [`RedisCounterStore`]: `INCR` + `EXPIRE`, shared across instances
//! - [`MemoryCounterStore`]: Moka cache with the window as TTL, single instance
//!
//! A failing store never blocks a submission: the limiter fails open and logs.

use async_trait::async_trait;
use moka::future::Cache;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Counter store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Counter store unavailable: {0}")]
    Unavailable(String),
}

/// State of one window after counting a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub count: u64,
    /// Time until the window resets
    pub resets_in: Duration,
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Count one hit against `key`, starting a window of `window` if none is open.
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowCount, RateLimitError>;
}

// ============================================================================
// Redis store
// ============================================================================

pub struct RedisCounterStore {
    connection: ConnectionManager,
}

impl RedisCounterStore {
    pub async fn connect(redis_url: &str) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowCount, RateLimitError> {
        let mut conn = self.connection.clone();
        let window_secs = window.as_secs().max(1) as i64;

        let count: u64 = conn.incr(key, 1u64).await?;
        if count == 1 {
            let _: () = conn.expire(key, window_secs).await?;
        }

        let ttl: i64 = conn.ttl(key).await?;
        let ttl = if ttl < 0 {
            // Expiry lost (crash between INCR and EXPIRE): start the window now
            let _: () = conn.expire(key, window_secs).await?;
            window_secs
        } else {
            ttl
        };

        Ok(WindowCount {
            count,
            resets_in: Duration::from_secs(ttl as u64),
        })
    }
}

// ============================================================================
// In-memory store
// ============================================================================

struct Window {
    started: Instant,
    count: AtomicU64,
}

pub struct MemoryCounterStore {
    windows: Cache<String, Arc<Window>>,
}

impl MemoryCounterStore {
    /// `window` must match the limiter's window; entries expire with it.
    pub fn new(window: Duration) -> Self {
        let windows = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(window)
            .build();
        Self { windows }
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowCount, RateLimitError> {
        let entry = self
            .windows
            .get_with(key.to_string(), async {
                Arc::new(Window {
                    started: Instant::now(),
                    count: AtomicU64::new(0),
                })
            })
            .await;

        let count = entry.count.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(WindowCount {
            count,
            resets_in: window.saturating_sub(entry.started.elapsed()),
        })
    }
}

// ============================================================================
// Limiter
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u64 },
    Limited { retry_after: Duration },
}

pub struct FixedWindowLimiter {
    store: Arc<dyn CounterStore>,
    prefix: String,
    max_requests: u64,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn CounterStore>, prefix: &str, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            prefix: prefix.to_string(),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    /// Count a request from `client` and decide whether it may proceed.
    pub async fn check(&self, client: &str) -> RateDecision {
        let key = format!("{}:{}", self.prefix, client);

        match self.store.hit(&key, self.window).await {
            Ok(window) if window.count > self.max_requests => {
                tracing::info!("Rate limit exceeded for {} ({} hits)", key, window.count);
                RateDecision::Limited {
                    // Never advertise a zero-second retry
                    retry_after: window.resets_in.max(Duration::from_secs(1)),
                }
            }
            Ok(window) => RateDecision::Allowed {
                remaining: self.max_requests - window.count,
            },
            Err(e) => {
                tracing::warn!("Rate limit store failed, allowing request: {}", e);
                RateDecision::Allowed { remaining: self.max_requests }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    #[async_trait]
    impl CounterStore for BrokenStore {
        async fn hit(&self, _key: &str, _window: Duration) -> Result<WindowCount, RateLimitError> {
            Err(RateLimitError::Unavailable("connection refused".to_string()))
        }
    }

    fn memory_limiter(max: u64) -> FixedWindowLimiter {
        let window = Duration::from_secs(60);
        FixedWindowLimiter::new(Arc::new(MemoryCounterStore::new(window)), "test", max, window)
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_blocks() {
        let limiter = memory_limiter(3);

        assert_eq!(limiter.check("10.0.0.1").await, RateDecision::Allowed { remaining: 2 });
        assert_eq!(limiter.check("10.0.0.1").await, RateDecision::Allowed { remaining: 1 });
        assert_eq!(limiter.check("10.0.0.1").await, RateDecision::Allowed { remaining: 0 });

        match limiter.check("10.0.0.1").await {
            RateDecision::Limited { retry_after } => {
                assert!(retry_after <= Duration::from_secs(60));
                assert!(retry_after >= Duration::from_secs(1));
            }
            other => panic!("expected limit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clients_counted_separately() {
        let limiter = memory_limiter(1);
        assert!(matches!(limiter.check("a").await, RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check("b").await, RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check("a").await, RateDecision::Limited { .. }));
    }

    #[tokio::test]
    async fn test_window_expiry_resets_count() {
        let window = Duration::from_millis(50);
        let limiter = FixedWindowLimiter::new(Arc::new(MemoryCounterStore::new(window)), "test", 1, window);

        assert!(matches!(limiter.check("c").await, RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check("c").await, RateDecision::Limited { .. }));

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(matches!(limiter.check("c").await, RateDecision::Allowed { .. }));
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let limiter = FixedWindowLimiter::new(Arc::new(BrokenStore), "test", 5, Duration::from_secs(60));
        assert_eq!(limiter.check("d").await, RateDecision::Allowed { remaining: 5 });
    }
}
