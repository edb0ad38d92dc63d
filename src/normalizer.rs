//! Field normalization and validity filtering
//!
//! Adapters declare their field paths as serde structs. Every field goes
//! through one of the lenient deserializers below, so a missing or oddly
//! shaped field resolves to that field's default instead of failing the node.
//!
//! After normalization, records without a parsable timestamp are dropped here
//! and nowhere else.

use crate::adapters::SourceAdapter;
use crate::types::{CanonicalRecord, RawPostNode};
use chrono::{DateTime, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Applies field normalization and the timestamp validity filter
pub struct Normalizer;

impl Normalizer {
    /// Normalize a raw node, returning `None` when its timestamp is invalid
    pub fn normalize(
        adapter: &dyn SourceAdapter,
        node: &RawPostNode,
    ) -> Option<(CanonicalRecord, NaiveDateTime)> {
        let record = adapter.normalize(node);
        let timestamp = record.timestamp?;
        Some((record, timestamp))
    }
}

/// Deserialize a field, substituting its default for any unexpected shape
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Deserialize a non-negative interaction counter, defaulting to 0
pub(crate) fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(counter_value(&value))
}

/// Deserialize an identifier that may be exported as a string or a number
pub(crate) fn identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Deserialize an epoch-seconds field; `None` marks an invalid timestamp
pub(crate) fn epoch_seconds<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_epoch_seconds(&value))
}

fn counter_value(value: &Value) -> u64 {
    let Value::Number(n) = value else {
        return 0;
    };

    n.as_u64()
        .or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .filter(|f| *f <= u64::MAX as f64)
                .map(|f| f as u64)
        })
        .unwrap_or(0)
}

/// Parse epoch seconds given as an integer, a float or a numeric string
pub fn parse_epoch_seconds(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(secs) => from_seconds(secs, 0),
            None => n.as_f64().and_then(from_fractional_seconds),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<i64>() {
                Ok(secs) => from_seconds(secs, 0),
                Err(_) => trimmed.parse::<f64>().ok().and_then(from_fractional_seconds),
            }
        }
        _ => None,
    }
}

fn from_seconds(secs: i64, nanos: u32) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
}

fn from_fractional_seconds(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() || secs.abs() >= i64::MAX as f64 {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0).round().min(999_999_999.0) as u32;
    from_seconds(whole as i64, nanos)
}

/// Hashtags found lexically in a caption
///
/// Every whitespace-separated token starting with `#` becomes a tag with its
/// `#` characters trimmed from both ends. Trailing punctuation is kept as-is.
pub fn lexical_hashtags(caption: &str) -> Vec<String> {
    caption
        .split_whitespace()
        .filter(|token| token.starts_with('#'))
        .map(|token| token.trim_matches('#'))
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Clean an explicitly listed tag name, dropping it when empty
pub(crate) fn explicit_hashtag(name: &str) -> Option<String> {
    let tag = name.trim().trim_start_matches('#');
    (!tag.is_empty()).then(|| tag.to_string())
}
