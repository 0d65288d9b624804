//! Types for the metadata resolver boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display metadata for a reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedMetadata {
    /// Human-readable title.
    pub title: String,
    /// Thumbnail URL, if the source exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl ResolvedMetadata {
    /// Creates metadata with a title and no thumbnail.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            thumbnail: None,
        }
    }
}

/// Errors that can occur during metadata resolution.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The source could not be queried.
    #[error("metadata unavailable: {reason}")]
    Unavailable { reason: String },

    /// Resolution did not finish within the configured timeout.
    #[error("metadata resolution timed out after {secs} seconds")]
    Timeout { secs: u64 },
}

impl ResolverError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}
