//! Instagram export adapter
//!
//! Instagram exports are GraphQL responses shaped as
//! `{"data": {"posts": [{"node": {...}}, ...]}}`. Captions are nested under
//! `edge_media_to_caption.edges[0].node.text` and hashtags are found
//! lexically in the caption.

use crate::engagement::EngagementPolicy;
use crate::error::ComputeError;
use crate::normalizer::{counter, epoch_seconds, identifier, lenient, lexical_hashtags};
use crate::types::{CanonicalRecord, Platform, RawPostNode};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use super::SourceAdapter;

/// Instagram export adapter
pub struct InstagramAdapter;

impl SourceAdapter for InstagramAdapter {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn extract(&self, raw_json: &str) -> Result<Vec<RawPostNode>, ComputeError> {
        let value: Value = serde_json::from_str(raw_json)?;
        let document = InstagramDocument::deserialize(&value)
            .map_err(|_| ComputeError::structure("an object with a `data.posts` array"))?;

        let nodes = document
            .data
            .posts
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(mut wrapper) => match wrapper.remove("node") {
                    Some(Value::Object(node)) => Some(node),
                    _ => None,
                },
                _ => None,
            })
            .collect();

        Ok(nodes)
    }

    fn normalize(&self, node: &RawPostNode) -> CanonicalRecord {
        let post: InstagramPost =
            serde_json::from_value(Value::Object(node.clone())).unwrap_or_default();

        let caption = post.caption();
        let hashtags = lexical_hashtags(&caption);

        CanonicalRecord {
            post_id: post.id,
            caption,
            timestamp: post.taken_at_timestamp,
            likes: post.edge_liked_by.count,
            comments: post.edge_media_to_comment.count,
            shares: None,
            views: post.video_view_count,
            media_type: post.typename,
            hashtags,
        }
    }

    fn engagement_policy(&self) -> EngagementPolicy {
        // Most posts are images with no view count at all
        EngagementPolicy::PlusOneDenominator
    }
}

// Instagram export structures

#[derive(Debug, Deserialize)]
struct InstagramDocument {
    data: InstagramData,
}

#[derive(Debug, Deserialize)]
struct InstagramData {
    posts: Vec<Value>,
}

/// Field table for one post node; every field falls back to its default
#[derive(Debug, Default, Deserialize)]
struct InstagramPost {
    #[serde(default, deserialize_with = "identifier")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    edge_media_to_caption: CaptionEdges,
    #[serde(default, deserialize_with = "lenient")]
    caption: Option<String>,
    #[serde(default, deserialize_with = "epoch_seconds")]
    taken_at_timestamp: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient")]
    edge_liked_by: CountEdge,
    #[serde(default, deserialize_with = "lenient")]
    edge_media_to_comment: CountEdge,
    #[serde(default, deserialize_with = "counter")]
    video_view_count: u64,
    #[serde(default, rename = "__typename", deserialize_with = "lenient")]
    typename: Option<String>,
}

impl InstagramPost {
    /// First caption edge, falling back to a top-level caption string
    fn caption(&self) -> String {
        let nested = self
            .edge_media_to_caption
            .edges
            .first()
            .and_then(|edge| edge.node.text.as_deref())
            .unwrap_or_default();

        if !nested.is_empty() {
            return nested.to_string();
        }
        self.caption.clone().unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
struct CaptionEdges {
    #[serde(default, deserialize_with = "lenient")]
    edges: Vec<CaptionEdge>,
}

#[derive(Debug, Default, Deserialize)]
struct CaptionEdge {
    #[serde(default, deserialize_with = "lenient")]
    node: CaptionNode,
}

#[derive(Debug, Default, Deserialize)]
struct CaptionNode {
    #[serde(default, deserialize_with = "lenient")]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CountEdge {
    #[serde(default, deserialize_with = "counter")]
    count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(value: Value) -> RawPostNode {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_extract_instagram_document() {
        let json = r#"{
            "data": {
                "count": 3,
                "posts": [
                    {"node": {"id": "1"}},
                    {"cursor": "no node here"},
                    "not an object",
                    {"node": {"id": "2"}}
                ]
            }
        }"#;

        let nodes = InstagramAdapter.extract(json).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["id"], "1");
        assert_eq!(nodes[1]["id"], "2");
    }

    #[test]
    fn test_extract_rejects_missing_posts() {
        let err = InstagramAdapter.extract(r#"{"data": {"count": 0}}"#).unwrap_err();
        assert!(matches!(err, ComputeError::Structure { .. }));

        let err = InstagramAdapter.extract(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, ComputeError::Structure { .. }));

        let err = InstagramAdapter.extract("{not json").unwrap_err();
        assert!(matches!(err, ComputeError::InvalidJson(_)));
    }

    #[test]
    fn test_normalize_full_node() {
        let raw = node(json!({
            "id": "3281",
            "__typename": "GraphVideo",
            "taken_at_timestamp": 1705314600,
            "edge_media_to_caption": {"edges": [{"node": {"text": "Great day! #fun #sun"}}]},
            "edge_liked_by": {"count": 120},
            "edge_media_to_comment": {"count": 8},
            "video_view_count": 1500
        }));

        let record = InstagramAdapter.normalize(&raw);
        assert_eq!(record.post_id.as_deref(), Some("3281"));
        assert_eq!(record.caption, "Great day! #fun #sun");
        assert_eq!(record.hashtags, vec!["fun", "sun"]);
        assert_eq!(record.likes, 120);
        assert_eq!(record.comments, 8);
        assert_eq!(record.views, 1500);
        assert_eq!(record.shares, None);
        assert_eq!(record.media_type.as_deref(), Some("GraphVideo"));

        let ts = record.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2024, 1, 15, 10));
    }

    #[test]
    fn test_caption_falls_back_to_top_level() {
        let raw = node(json!({
            "edge_media_to_caption": {"edges": []},
            "caption": "plain caption #tag"
        }));
        let record = InstagramAdapter.normalize(&raw);
        assert_eq!(record.caption, "plain caption #tag");
        assert_eq!(record.hashtags, vec!["tag"]);

        let raw = node(json!({
            "edge_media_to_caption": {"edges": [{"node": {"text": ""}}]},
            "caption": "fallback"
        }));
        assert_eq!(InstagramAdapter.normalize(&raw).caption, "fallback");
    }

    #[test]
    fn test_missing_and_malformed_fields_default() {
        let raw = node(json!({
            "id": 42,
            "caption": {"text": "not a string"},
            "edge_media_to_caption": "broken",
            "edge_liked_by": {"count": "many"},
            "edge_media_to_comment": 7,
            "video_view_count": null,
            "__typename": 5
        }));

        let record = InstagramAdapter.normalize(&raw);
        assert_eq!(record.post_id.as_deref(), Some("42"));
        assert_eq!(record.caption, "");
        assert!(record.hashtags.is_empty());
        assert_eq!(record.likes, 0);
        assert_eq!(record.comments, 0);
        assert_eq!(record.views, 0);
        assert_eq!(record.media_type, None);
        assert_eq!(record.timestamp, None);
    }

    #[test]
    fn test_engagement_policy() {
        assert_eq!(
            InstagramAdapter.engagement_policy(),
            EngagementPolicy::PlusOneDenominator
        );
        assert_eq!(InstagramAdapter.platform(), Platform::Instagram);
    }
}
