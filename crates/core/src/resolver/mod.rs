//! Metadata resolver boundary.
//!
//! Resolving a reference to a display title and thumbnail is an external
//! concern; the crate only defines the call contract. Resolution is
//! best-effort: a failure degrades the job's display, never the job itself.

mod traits;
mod types;

pub use traits::MetadataResolver;
pub use types::{ResolvedMetadata, ResolverError};
