//! Source export adapters
//!
//! This module provides adapters that pull raw post nodes out of a platform's
//! export documents and map each node onto the canonical record.

mod instagram;
mod tiktok;

pub use instagram::InstagramAdapter;
pub use tiktok::TikTokAdapter;

use crate::engagement::EngagementPolicy;
use crate::error::ComputeError;
use crate::types::{CanonicalRecord, Platform, RawPostNode};

/// Trait for platform export adapters
pub trait SourceAdapter: Send + Sync {
    /// Platform tag written to every row produced by this adapter
    fn platform(&self) -> Platform;

    /// Parse one export document and return its raw post nodes in order
    fn extract(&self, raw_json: &str) -> Result<Vec<RawPostNode>, ComputeError>;

    /// Map a raw post node onto the canonical record; never fails
    fn normalize(&self, node: &RawPostNode) -> CanonicalRecord;

    /// Denominator strategy used for this platform's engagement rate
    fn engagement_policy(&self) -> EngagementPolicy;
}

impl Platform {
    /// Adapter handling this platform's export format
    pub fn adapter(&self) -> &'static dyn SourceAdapter {
        match self {
            Platform::Instagram => &InstagramAdapter,
            Platform::TikTok => &TikTokAdapter,
        }
    }
}
