//! Trait definition for the metadata resolver boundary.

use async_trait::async_trait;

use super::types::{ResolvedMetadata, ResolverError};

/// Resolves a media reference to display metadata.
///
/// Implementations talk to whatever backend knows about the reference; the
/// orchestrator applies its own timeout around `resolve` and treats every
/// error as non-fatal.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Returns the name of this resolver implementation.
    fn name(&self) -> &str;

    /// Resolves a reference to a title and optional thumbnail.
    async fn resolve(&self, reference: &str) -> Result<ResolvedMetadata, ResolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticResolver;

    #[async_trait]
    impl MetadataResolver for StaticResolver {
        fn name(&self) -> &str {
            "static"
        }

        async fn resolve(&self, reference: &str) -> Result<ResolvedMetadata, ResolverError> {
            if reference.contains("missing") {
                return Err(ResolverError::unavailable("no such reference"));
            }
            Ok(ResolvedMetadata {
                title: format!("Title of {reference}"),
                thumbnail: Some(format!("{reference}/thumb.jpg")),
            })
        }
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let resolver = StaticResolver;
        let meta = resolver.resolve("https://example.com/v/1").await.unwrap();
        assert_eq!(meta.title, "Title of https://example.com/v/1");
        assert!(meta.thumbnail.is_some());
    }

    #[tokio::test]
    async fn test_resolve_failure() {
        let resolver = StaticResolver;
        let result = resolver.resolve("missing").await;
        assert!(matches!(result, Err(ResolverError::Unavailable { .. })));
    }
}
