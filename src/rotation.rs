//! Key rotation counter contract
//!
//! Call counts live outside this crate (typically in a persistent store
//! shared by several processes) so that quota tracking survives restarts.
//! The channel only ever reads counts and requests increments; a stale
//! read that over- or under-selects a key by one call is accepted.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;

/// Externally-owned per-credential call counter
///
/// Keys are credential indices rendered as strings ("0" is the primary
/// API password, "1".. are the extra keys). Missing entries count as zero.
#[async_trait]
pub trait KeyRotationCounter: Send + Sync {
    async fn get(&self) -> Result<HashMap<String, u64>>;
    async fn increment(&self, key_index: &str) -> Result<()>;
    async fn reset(&self) -> Result<()>;
}

/// Process-local counter, suitable for tests and single-instance use
#[derive(Debug, Default)]
pub struct InMemoryKeyCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl InMemoryKeyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the counter with known counts
    pub fn with_counts(counts: HashMap<String, u64>) -> Self {
        Self {
            counts: Mutex::new(counts),
        }
    }
}

#[async_trait]
impl KeyRotationCounter for InMemoryKeyCounter {
    async fn get(&self) -> Result<HashMap<String, u64>> {
        Ok(self
            .counts
            .lock()
            .map_err(|e| crate::error::Cin7Error::Other(e.to_string()))?
            .clone())
    }

    async fn increment(&self, key_index: &str) -> Result<()> {
        let mut counts = self
            .counts
            .lock()
            .map_err(|e| crate::error::Cin7Error::Other(e.to_string()))?;
        *counts.entry(key_index.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.counts
            .lock()
            .map_err(|e| crate::error::Cin7Error::Other(e.to_string()))?
            .clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn increment_creates_missing_entries() {
        let counter = InMemoryKeyCounter::new();
        counter.increment("1").await.unwrap();
        counter.increment("1").await.unwrap();

        let counts = counter.get().await.unwrap();
        assert_eq!(counts.get("1"), Some(&2));
        assert_eq!(counts.get("0"), None);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let counter = InMemoryKeyCounter::new();
        counter.increment("0").await.unwrap();
        counter.reset().await.unwrap();
        assert!(counter.get().await.unwrap().is_empty());
    }
}
