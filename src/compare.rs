//! Cross-platform comparison
//!
//! Reads persisted tables back on the shared column subset only and
//! aggregates engagement per platform.

use crate::error::ComputeError;
use crate::report::{EmojiSplit, MeanAccumulator};
use crate::types::{EnrichedRecord, Platform};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The columns every platform's table shares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedRow {
    pub platform: Platform,
    pub engagement_rate: f64,
    pub caption_length: usize,
    #[serde(deserialize_with = "flexible_bool")]
    pub has_emoji: bool,
    pub hour: u32,
}

impl From<&EnrichedRecord> for SharedRow {
    fn from(row: &EnrichedRecord) -> Self {
        SharedRow {
            platform: row.platform,
            engagement_rate: row.features.engagement_rate,
            caption_length: row.features.caption_length,
            has_emoji: row.features.has_emoji,
            hour: row.features.hour,
        }
    }
}

/// Accepts `true`/`false` as well as the capitalized `True`/`False`
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "true" | "True" | "TRUE" | "1" => Ok(true),
        "false" | "False" | "FALSE" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid boolean `{other}`"))),
    }
}

/// Read the shared columns of a persisted table, ignoring all other columns
pub fn read_shared_rows(path: &Path) -> Result<Vec<SharedRow>, ComputeError> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<SharedRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn read_non_empty(path: &Path) -> Result<Vec<SharedRow>, ComputeError> {
    let rows = read_shared_rows(path)?;
    if rows.is_empty() {
        return Err(ComputeError::NoUsableData(format!("no rows in {}", path.display())));
    }
    Ok(rows)
}

/// Aggregates for one platform within a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformComparison {
    pub platform: Platform,
    pub posts: usize,
    pub mean_engagement: f64,
    pub emoji_split: EmojiSplit,
    pub mean_engagement_by_hour: BTreeMap<u32, f64>,
    pub mean_caption_length: f64,
}

/// Per-platform aggregates over concatenated shared rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Sorted by platform name
    pub platforms: Vec<PlatformComparison>,
}

#[derive(Default)]
struct PlatformAccumulator {
    posts: usize,
    engagement: MeanAccumulator,
    with_emoji: MeanAccumulator,
    without_emoji: MeanAccumulator,
    by_hour: BTreeMap<u32, MeanAccumulator>,
    caption_length: MeanAccumulator,
}

impl Comparison {
    pub fn build(rows: &[SharedRow]) -> Result<Self, ComputeError> {
        if rows.is_empty() {
            return Err(ComputeError::NoUsableData("no rows to compare".to_string()));
        }

        let mut by_platform: BTreeMap<Platform, PlatformAccumulator> = BTreeMap::new();
        for row in rows {
            let acc = by_platform.entry(row.platform).or_default();
            acc.posts += 1;
            acc.engagement.add(row.engagement_rate);
            if row.has_emoji {
                acc.with_emoji.add(row.engagement_rate);
            } else {
                acc.without_emoji.add(row.engagement_rate);
            }
            acc.by_hour
                .entry(row.hour)
                .or_default()
                .add(row.engagement_rate);
            acc.caption_length.add(row.caption_length as f64);
        }

        let platforms = by_platform
            .into_iter()
            .map(|(platform, acc)| PlatformComparison {
                platform,
                posts: acc.posts,
                // Every accumulator here holds at least one row
                mean_engagement: acc.engagement.mean().unwrap_or_default(),
                emoji_split: EmojiSplit {
                    with_emoji: acc.with_emoji.mean(),
                    without_emoji: acc.without_emoji.mean(),
                },
                mean_engagement_by_hour: acc
                    .by_hour
                    .into_iter()
                    .filter_map(|(hour, mean)| mean.mean().map(|m| (hour, m)))
                    .collect(),
                mean_caption_length: acc.caption_length.mean().unwrap_or_default(),
            })
            .collect();

        Ok(Comparison { platforms })
    }

    /// Read two persisted tables and compare them; either table being empty is
    /// `NoUsableData`
    pub fn from_csv_paths(tiktok: &Path, instagram: &Path) -> Result<Self, ComputeError> {
        let mut rows = read_non_empty(tiktok)?;
        rows.extend(read_non_empty(instagram)?);
        Self::build(&rows)
    }

    pub fn platform(&self, platform: Platform) -> Option<&PlatformComparison> {
        self.platforms.iter().find(|p| p.platform == platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn shared(platform: Platform, rate: f64, length: usize, emoji: bool, hour: u32) -> SharedRow {
        SharedRow {
            platform,
            engagement_rate: rate,
            caption_length: length,
            has_emoji: emoji,
            hour,
        }
    }

    #[test]
    fn test_comparison_groups_by_platform() {
        let rows = vec![
            shared(Platform::TikTok, 0.2, 10, true, 9),
            shared(Platform::TikTok, 0.4, 30, false, 9),
            shared(Platform::Instagram, 10.0, 100, true, 20),
        ];

        let comparison = Comparison::build(&rows).unwrap();
        assert_eq!(comparison.platforms.len(), 2);
        assert_eq!(comparison.platforms[0].platform, Platform::Instagram);
        assert_eq!(comparison.platforms[1].platform, Platform::TikTok);

        let tiktok = comparison.platform(Platform::TikTok).unwrap();
        assert_eq!(tiktok.posts, 2);
        assert!((tiktok.mean_engagement - 0.3).abs() < 1e-12);
        assert_eq!(tiktok.emoji_split.with_emoji, Some(0.2));
        assert_eq!(tiktok.emoji_split.without_emoji, Some(0.4));
        assert!((tiktok.mean_engagement_by_hour[&9] - 0.3).abs() < 1e-12);
        assert_eq!(tiktok.mean_caption_length, 20.0);

        let instagram = comparison.platform(Platform::Instagram).unwrap();
        assert_eq!(instagram.emoji_split.without_emoji, None);
    }

    #[test]
    fn test_empty_comparison_is_no_usable_data() {
        assert!(matches!(
            Comparison::build(&[]),
            Err(ComputeError::NoUsableData(_))
        ));
    }

    #[test]
    fn test_read_shared_rows_ignores_other_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "platform,caption,engagement_rate,caption_length,has_emoji,hour,views"
        )
        .unwrap();
        writeln!(file, "TikTok,\"hi, there\",0.25,9,True,14,400").unwrap();
        writeln!(file, "Instagram,,3.5,0,false,2,").unwrap();
        file.flush().unwrap();

        let rows = read_shared_rows(file.path()).unwrap();
        assert_eq!(
            rows,
            vec![
                shared(Platform::TikTok, 0.25, 9, true, 14),
                shared(Platform::Instagram, 3.5, 0, false, 2),
            ]
        );
    }

    #[test]
    fn test_empty_table_is_no_usable_data() {
        let dir = tempfile::tempdir().unwrap();
        let tiktok = dir.path().join("cleaned_tiktok.csv");
        let instagram = dir.path().join("cleaned_instagram.csv");
        std::fs::write(
            &tiktok,
            "platform,engagement_rate,caption_length,has_emoji,hour\nTikTok,0.5,3,false,9\n",
        )
        .unwrap();
        std::fs::write(
            &instagram,
            "platform,engagement_rate,caption_length,has_emoji,hour\n",
        )
        .unwrap();

        match Comparison::from_csv_paths(&tiktok, &instagram) {
            Err(ComputeError::NoUsableData(msg)) => {
                assert!(msg.contains("cleaned_instagram.csv"));
            }
            other => panic!("expected NoUsableData, got {other:?}"),
        }
        assert!(Comparison::from_csv_paths(&tiktok, &tiktok).is_ok());
    }
}
