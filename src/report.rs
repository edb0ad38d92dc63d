//! Per-platform engagement report
//!
//! Simple aggregates over one assembled dataset: engagement by hour, weekday
//! and caption bucket, the caption length correlation, the emoji split and the
//! most common hashtags among high-engagement posts.

use crate::dataset::Dataset;
use crate::types::{CaptionBin, EnrichedRecord, Platform};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Engagement rate quantile that marks a post as high-engagement
pub const HIGH_ENGAGEMENT_QUANTILE: f64 = 0.75;

/// Number of hashtags listed in a report
pub const TOP_HASHTAGS: usize = 10;

/// Running mean
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub(crate) fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Mean engagement rate of posts with and without emoji
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmojiSplit {
    pub with_emoji: Option<f64>,
    pub without_emoji: Option<f64>,
}

/// Aggregates for one platform's dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformReport {
    pub platform: Platform,
    pub posts: usize,
    pub mean_engagement_by_hour: BTreeMap<u32, f64>,
    /// Sorted ascending by mean engagement
    pub mean_engagement_by_weekday: Vec<(String, f64)>,
    /// Only buckets that contain posts, in bucket order
    pub mean_engagement_by_caption_bin: Vec<(CaptionBin, f64)>,
    pub average_caption_length: Option<f64>,
    pub caption_length_correlation: Option<f64>,
    pub emoji_split: EmojiSplit,
    /// Hashtag counts among posts at or above the high-engagement quantile
    pub top_hashtags: Vec<(String, usize)>,
}

impl PlatformReport {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self::build(dataset.platform(), dataset.rows())
    }

    pub fn build(platform: Platform, rows: &[EnrichedRecord]) -> Self {
        let mut by_hour: BTreeMap<u32, MeanAccumulator> = BTreeMap::new();
        let mut by_weekday: HashMap<&str, MeanAccumulator> = HashMap::new();
        let mut by_bin: BTreeMap<CaptionBin, MeanAccumulator> = BTreeMap::new();
        let mut caption_length = MeanAccumulator::default();
        let mut with_emoji = MeanAccumulator::default();
        let mut without_emoji = MeanAccumulator::default();

        for row in rows {
            let features = &row.features;
            let rate = features.engagement_rate;

            by_hour.entry(features.hour).or_default().add(rate);
            by_weekday.entry(features.weekday.as_str()).or_default().add(rate);
            if let Some(bin) = features.caption_bin {
                by_bin.entry(bin).or_default().add(rate);
            }
            caption_length.add(features.caption_length as f64);
            if features.has_emoji {
                with_emoji.add(rate);
            } else {
                without_emoji.add(rate);
            }
        }

        let mut mean_engagement_by_weekday: Vec<(String, f64)> = by_weekday
            .into_iter()
            .filter_map(|(day, acc)| acc.mean().map(|m| (day.to_string(), m)))
            .collect();
        mean_engagement_by_weekday
            .sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let lengths: Vec<f64> = rows
            .iter()
            .map(|r| r.features.caption_length as f64)
            .collect();
        let rates: Vec<f64> = rows.iter().map(|r| r.features.engagement_rate).collect();

        PlatformReport {
            platform,
            posts: rows.len(),
            mean_engagement_by_hour: by_hour
                .into_iter()
                .filter_map(|(hour, acc)| acc.mean().map(|m| (hour, m)))
                .collect(),
            mean_engagement_by_weekday,
            mean_engagement_by_caption_bin: by_bin
                .into_iter()
                .filter_map(|(bin, acc)| acc.mean().map(|m| (bin, m)))
                .collect(),
            average_caption_length: caption_length.mean(),
            caption_length_correlation: pearson(&lengths, &rates),
            emoji_split: EmojiSplit {
                with_emoji: with_emoji.mean(),
                without_emoji: without_emoji.mean(),
            },
            top_hashtags: top_hashtags(rows),
        }
    }
}

/// Quantile with linear interpolation between order statistics
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Pearson correlation; `None` for fewer than two points or zero variance
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }

    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }
    Some(covariance / (variance_x.sqrt() * variance_y.sqrt()))
}

/// Most common hashtags among high-engagement posts; ties keep first-seen order
fn top_hashtags(rows: &[EnrichedRecord]) -> Vec<(String, usize)> {
    let rates: Vec<f64> = rows.iter().map(|r| r.features.engagement_rate).collect();
    let Some(threshold) = quantile(&rates, HIGH_ENGAGEMENT_QUANTILE) else {
        return Vec::new();
    };

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let high_engagement = rows
        .iter()
        .filter(|r| r.features.engagement_rate >= threshold);
    for row in high_engagement {
        for tag in &row.record.hashtags {
            match index.get(tag.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(tag.as_str(), counts.len());
                    counts.push((tag.clone(), 1));
                }
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_HASHTAGS);
    counts
}
