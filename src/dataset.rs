//! Canonical dataset assembly and persistence
//!
//! The assembled table has one row per surviving record and the same fixed
//! column set for every platform, so tables from both sources can be
//! concatenated on the shared columns.

use crate::error::ComputeError;
use crate::types::{EnrichedRecord, Platform};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column header of every persisted table
pub const COLUMNS: [&str; 16] = [
    "platform",
    "post_id",
    "caption",
    "timestamp",
    "likes",
    "comments",
    "shares",
    "views",
    "media_type",
    "hashtags",
    "engagement_rate",
    "hour",
    "weekday",
    "caption_length",
    "caption_bin",
    "has_emoji",
];

/// Columns every platform shares, used for cross-platform comparison
pub const SHARED_COLUMNS: [&str; 5] = [
    "platform",
    "engagement_rate",
    "caption_length",
    "has_emoji",
    "hour",
];

/// Timestamp format used in the `timestamp` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Record counts at each stage of one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    /// Documents handed to the pipeline
    pub documents: usize,
    /// Documents skipped with a diagnostic
    pub skipped_documents: usize,
    /// Raw post nodes extracted
    pub raw_nodes: usize,
    /// Records with a valid timestamp
    pub valid_timestamps: usize,
    /// Records written to the table
    pub survivors: usize,
}

/// All surviving, feature-enriched records of one platform
#[derive(Debug, Clone)]
pub struct Dataset {
    platform: Platform,
    rows: Vec<EnrichedRecord>,
    summary: PipelineSummary,
}

impl Dataset {
    pub(crate) fn new(platform: Platform) -> Self {
        Self {
            platform,
            rows: Vec::new(),
            summary: PipelineSummary::default(),
        }
    }

    pub(crate) fn push(&mut self, row: EnrichedRecord) {
        self.rows.push(row);
        self.summary.survivors = self.rows.len();
    }

    pub(crate) fn summary_mut(&mut self) -> &mut PipelineSummary {
        &mut self.summary
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Rows in extraction order
    pub fn rows(&self) -> &[EnrichedRecord] {
        &self.rows
    }

    pub fn summary(&self) -> &PipelineSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows, or `NoUsableData` when nothing survived
    pub fn require_rows(&self) -> Result<&[EnrichedRecord], ComputeError> {
        if self.rows.is_empty() {
            return Err(ComputeError::NoUsableData(format!(
                "no usable {} posts found",
                self.platform
            )));
        }
        Ok(&self.rows)
    }

    /// Write the table as CSV with the fixed header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ComputeError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        // Written explicitly so an empty table still carries its header
        csv_writer.write_record(COLUMNS)?;
        for row in &self.rows {
            csv_writer.serialize(DatasetRow::try_from(row)?)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the table as CSV to a file
    pub fn write_csv_path(&self, path: impl AsRef<Path>) -> Result<(), ComputeError> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}

/// Flat row layout matching [`COLUMNS`]
#[derive(Debug, Serialize)]
struct DatasetRow<'a> {
    platform: &'static str,
    post_id: Option<&'a str>,
    caption: &'a str,
    timestamp: String,
    likes: u64,
    comments: u64,
    shares: Option<u64>,
    views: u64,
    media_type: Option<&'a str>,
    hashtags: String,
    engagement_rate: f64,
    hour: u32,
    weekday: &'a str,
    caption_length: usize,
    caption_bin: Option<&'static str>,
    has_emoji: bool,
}

impl<'a> TryFrom<&'a EnrichedRecord> for DatasetRow<'a> {
    type Error = ComputeError;

    fn try_from(row: &'a EnrichedRecord) -> Result<Self, Self::Error> {
        let record = &row.record;
        let features = &row.features;

        Ok(DatasetRow {
            platform: row.platform.as_str(),
            post_id: record.post_id.as_deref(),
            caption: &record.caption,
            timestamp: record
                .timestamp
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            likes: record.likes,
            comments: record.comments,
            shares: record.shares,
            views: record.views,
            media_type: record.media_type.as_deref(),
            hashtags: serde_json::to_string(&record.hashtags)?,
            engagement_rate: features.engagement_rate,
            hour: features.hour,
            weekday: &features.weekday,
            caption_length: features.caption_length,
            caption_bin: features.caption_bin.map(|bin| bin.label()),
            has_emoji: features.has_emoji,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CanonicalRecord, CaptionBin, DerivedFeatures};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sample_row(platform: Platform) -> EnrichedRecord {
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        EnrichedRecord {
            platform,
            record: CanonicalRecord {
                post_id: Some("p1".to_string()),
                caption: "Great day, friends! #fun #sun".to_string(),
                timestamp: Some(timestamp),
                likes: 10,
                comments: 5,
                shares: None,
                views: 0,
                media_type: Some("GraphImage".to_string()),
                hashtags: vec!["fun".to_string(), "sun".to_string()],
            },
            features: DerivedFeatures {
                engagement_rate: 15.0,
                hour: 10,
                weekday: "Monday".to_string(),
                caption_length: 29,
                caption_bin: Some(CaptionBin::UpTo50),
                has_emoji: false,
            },
        }
    }

    fn write_to_string(dataset: &Dataset) -> String {
        let mut buffer = Vec::new();
        dataset.write_csv(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_empty_dataset_keeps_header() {
        let dataset = Dataset::new(Platform::TikTok);
        let output = write_to_string(&dataset);
        assert_eq!(output.trim_end(), COLUMNS.join(","));
        assert!(dataset.require_rows().is_err());
    }

    #[test]
    fn test_row_layout() {
        let mut dataset = Dataset::new(Platform::Instagram);
        dataset.push(sample_row(Platform::Instagram));

        let output = write_to_string(&dataset);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Instagram,p1,\"Great day, friends! #fun #sun\",2024-01-15 10:30:00,10,5,,0,GraphImage,\"[\"\"fun\"\",\"\"sun\"\"]\",15.0,10,Monday,29,0–50,false"
        );
        assert_eq!(dataset.summary().survivors, 1);
    }

    #[test]
    fn test_shared_columns_are_a_subset() {
        for column in SHARED_COLUMNS {
            assert!(COLUMNS.contains(&column));
        }
    }
}
