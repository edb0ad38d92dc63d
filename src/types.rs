//! Core types for the Engagement Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw documents and nodes, canonical records, derived features and
//! the enriched records that make up an assembled dataset.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One post exactly as shaped by its source export
pub type RawPostNode = serde_json::Map<String, serde_json::Value>;

/// Source platform of an export archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    TikTok,
}

impl Platform {
    /// Value written to the `platform` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A file-level document handed over by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Name used in diagnostics (usually the file path)
    pub name: String,
    /// Undecoded JSON text
    pub contents: String,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Source-independent representation of one post after normalization
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Platform post identifier
    pub post_id: Option<String>,
    /// Caption text, empty when the source has none
    pub caption: String,
    /// Posting instant (naive wall clock); `None` marks an invalid timestamp
    pub timestamp: Option<NaiveDateTime>,
    pub likes: u64,
    pub comments: u64,
    /// Only populated by sources that report shares
    pub shares: Option<u64>,
    pub views: u64,
    /// Only populated by sources that report a media kind
    pub media_type: Option<String>,
    /// Hashtags in source order, without `#` markers
    pub hashtags: Vec<String>,
}

/// Fixed caption length buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CaptionBin {
    #[serde(rename = "0–50")]
    UpTo50,
    #[serde(rename = "51–100")]
    UpTo100,
    #[serde(rename = "101–150")]
    UpTo150,
    #[serde(rename = "151+")]
    Over150,
}

impl CaptionBin {
    pub const ALL: [CaptionBin; 4] = [
        CaptionBin::UpTo50,
        CaptionBin::UpTo100,
        CaptionBin::UpTo150,
        CaptionBin::Over150,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CaptionBin::UpTo50 => "0–50",
            CaptionBin::UpTo100 => "51–100",
            CaptionBin::UpTo150 => "101–150",
            CaptionBin::Over150 => "151+",
        }
    }
}

impl fmt::Display for CaptionBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Secondary features attached to each surviving record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Interactions over the platform-specific denominator (finite, >= 0)
    pub engagement_rate: f64,
    /// Hour of day (0-23)
    pub hour: u32,
    /// English day name, e.g. "Monday"
    pub weekday: String,
    /// Caption length in characters
    pub caption_length: usize,
    /// `None` when the caption is longer than the last bucket
    pub caption_bin: Option<CaptionBin>,
    pub has_emoji: bool,
}

/// A canonical record together with its platform tag and derived features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub platform: Platform,
    pub record: CanonicalRecord,
    pub features: DerivedFeatures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_respects_width() {
        assert_eq!(format!("[{:<10}]", Platform::TikTok), "[TikTok    ]");
        assert_eq!(format!("[{:>8}]", CaptionBin::Over150), "[    151+]");
        assert_eq!(Platform::Instagram.to_string(), "Instagram");
    }
}
