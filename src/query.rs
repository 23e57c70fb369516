//! Request-keyed result cache for read queries.
//!
//! A key is fetched once and then served from memory until it is explicitly
//! invalidated. A failed fetch is retried a fixed number of times after a
//! short delay; nothing is cached on failure.
//!
//! The fetch itself runs off the UI loop, so the cache only stores results
//! and hands out the `RetryPolicy` the background fetch should follow.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Run `fetcher`, retrying failures up to `retries` times.
    pub async fn run<F, Fut, T, E>(&self, key: &str, mut fetcher: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(key, attempt, error = %err, "query failed, retrying");
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

pub struct QueryCache<T> {
    entries: HashMap<String, Arc<T>>,
    policy: RetryPolicy,
}

impl<T> QueryCache<T> {
    pub fn new(retries: u32, retry_delay: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            policy: RetryPolicy { retries, delay: retry_delay },
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: &str, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries.insert(key.to_string(), value.clone());
        value
    }

    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}
