//! Mock metadata resolver for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::resolver::{MetadataResolver, ResolvedMetadata, ResolverError};

/// Mock implementation of the MetadataResolver trait.
///
/// Provides controllable behavior for testing:
/// - Pre-configured metadata per reference
/// - Error injection
/// - Simulated resolution latency
/// - Recorded lookups for assertions
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    /// Pre-configured metadata by reference.
    metadata: Arc<RwLock<HashMap<String, ResolvedMetadata>>>,
    /// If set, the next lookup fails with this error.
    next_error: Arc<RwLock<Option<ResolverError>>>,
    /// Simulated resolution latency in milliseconds.
    delay_ms: Arc<RwLock<u64>>,
    /// References that were looked up.
    lookups: Arc<RwLock<Vec<String>>>,
}

impl MockResolver {
    /// Create a new mock resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-configure metadata for a reference.
    pub async fn set_metadata(&self, reference: impl Into<String>, meta: ResolvedMetadata) {
        self.metadata.write().await.insert(reference.into(), meta);
    }

    /// Configure the next lookup to fail with the given error.
    pub async fn set_next_error(&self, error: ResolverError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated resolution latency.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay_ms.write().await = delay.as_millis() as u64;
    }

    /// References that were looked up so far.
    pub async fn recorded_lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }

    /// Number of lookups performed.
    pub async fn lookup_count(&self) -> usize {
        self.lookups.read().await.len()
    }

    /// Default metadata derived from the reference.
    fn default_metadata(reference: &str) -> ResolvedMetadata {
        let slug = reference.rsplit('/').next().unwrap_or(reference);
        ResolvedMetadata {
            title: format!("Clip {slug}"),
            thumbnail: Some(format!("{reference}/thumb.jpg")),
        }
    }
}

#[async_trait]
impl MetadataResolver for MockResolver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve(&self, reference: &str) -> Result<ResolvedMetadata, ResolverError> {
        self.lookups.write().await.push(reference.to_string());

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let Some(meta) = self.metadata.read().await.get(reference) {
            return Ok(meta.clone());
        }

        Ok(Self::default_metadata(reference))
    }
}
