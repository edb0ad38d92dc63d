//! TikTok export adapter
//!
//! TikTok exports carry a flat `{"data": [...]}` list of aweme objects with
//! interaction counters under `statistics` and hashtags under `text_extra`.

use crate::engagement::EngagementPolicy;
use crate::error::ComputeError;
use crate::normalizer::{counter, epoch_seconds, explicit_hashtag, identifier, lenient};
use crate::types::{CanonicalRecord, Platform, RawPostNode};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use super::SourceAdapter;

/// TikTok export adapter
pub struct TikTokAdapter;

impl SourceAdapter for TikTokAdapter {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn extract(&self, raw_json: &str) -> Result<Vec<RawPostNode>, ComputeError> {
        let value: Value = serde_json::from_str(raw_json)?;
        let document = TikTokDocument::deserialize(&value)
            .map_err(|_| ComputeError::structure("an object with a `data` array"))?;

        let nodes = document
            .data
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(node) => Some(node),
                _ => None,
            })
            .collect();

        Ok(nodes)
    }

    fn normalize(&self, node: &RawPostNode) -> CanonicalRecord {
        let post: TikTokPost =
            serde_json::from_value(Value::Object(node.clone())).unwrap_or_default();

        let hashtags = post
            .text_extra
            .iter()
            .filter_map(|tag| tag.hashtag_name.as_deref())
            .filter_map(explicit_hashtag)
            .collect();

        CanonicalRecord {
            post_id: post.aweme_id,
            caption: post.desc.unwrap_or_default(),
            timestamp: post.create_time,
            likes: post.statistics.digg_count,
            comments: post.statistics.comment_count,
            shares: Some(post.statistics.share_count),
            views: post.statistics.play_count,
            media_type: None,
            hashtags,
        }
    }

    fn engagement_policy(&self) -> EngagementPolicy {
        // Every post is a video, so a zero play count means no usable signal
        EngagementPolicy::PositiveViewsDenominator
    }
}

// TikTok export structures

#[derive(Debug, Deserialize)]
struct TikTokDocument {
    data: Vec<Value>,
}

/// Field table for one aweme; every field falls back to its default
#[derive(Debug, Default, Deserialize)]
struct TikTokPost {
    #[serde(default, deserialize_with = "identifier")]
    aweme_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    desc: Option<String>,
    #[serde(default, deserialize_with = "epoch_seconds")]
    create_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient")]
    statistics: TikTokStatistics,
    #[serde(default, deserialize_with = "lenient")]
    text_extra: Vec<TikTokTextExtra>,
}

#[derive(Debug, Default, Deserialize)]
struct TikTokStatistics {
    #[serde(default, deserialize_with = "counter")]
    digg_count: u64,
    #[serde(default, deserialize_with = "counter")]
    comment_count: u64,
    #[serde(default, deserialize_with = "counter")]
    share_count: u64,
    #[serde(default, deserialize_with = "counter")]
    play_count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct TikTokTextExtra {
    #[serde(default, deserialize_with = "lenient")]
    hashtag_name: Option<String>,
}
