//! Feature derivation
//!
//! This module derives the source-independent features attached to every
//! surviving record:
//! - Hour of day and weekday name
//! - Caption length and caption length bucket
//! - Emoji presence

use crate::types::{CanonicalRecord, CaptionBin, DerivedFeatures};
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use regex::Regex;
use std::sync::OnceLock;

/// Upper edge of the last caption bucket; longer captions are uncategorized
pub const CAPTION_BIN_UPPER_BOUND: usize = 300;

/// Feature deriver for computing derived features
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derive features for a record that already passed the validity filters
    pub fn derive(
        record: &CanonicalRecord,
        timestamp: NaiveDateTime,
        engagement_rate: f64,
    ) -> DerivedFeatures {
        let caption_length = caption_length(&record.caption);

        DerivedFeatures {
            engagement_rate,
            hour: timestamp.hour(),
            weekday: weekday_name(timestamp.weekday()).to_string(),
            caption_length,
            caption_bin: caption_bin(caption_length),
            has_emoji: has_emoji(&record.caption),
        }
    }
}

/// Number of characters in a caption
pub fn caption_length(caption: &str) -> usize {
    caption.chars().count()
}

/// Bucket a caption length into `[0,50]`, `(50,100]`, `(100,150]`, `(150,300]`
pub fn caption_bin(length: usize) -> Option<CaptionBin> {
    match length {
        0..=50 => Some(CaptionBin::UpTo50),
        51..=100 => Some(CaptionBin::UpTo100),
        101..=150 => Some(CaptionBin::UpTo150),
        151..=CAPTION_BIN_UPPER_BOUND => Some(CaptionBin::Over150),
        _ => None,
    }
}

fn emoji_re() -> &'static Regex {
    static EMOJI_RE: OnceLock<Regex> = OnceLock::new();
    EMOJI_RE.get_or_init(|| {
        // Extended_Pictographic leaves out `#`, `*` and digits, which only
        // render as emoji inside keycap sequences. Skin tone modifiers and
        // regional indicators still count on their own.
        Regex::new(r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\x{1F1E6}-\x{1F1FF}]")
            .expect("valid emoji regex")
    })
}

/// Whether any character of the caption is an emoji code point
pub fn has_emoji(caption: &str) -> bool {
    emoji_re().is_match(caption)
}

/// English name of a weekday
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
