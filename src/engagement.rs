//! Engagement metric calculation
//!
//! The two platforms expose different reliable denominators, so the rate is
//! computed by one of two named strategies:
//! - `PlusOneDenominator`: `(likes + comments) / (views + 1)`, never drops
//! - `PositiveViewsDenominator`: `(likes + comments + shares) / views`, drops
//!   records without views

use crate::types::CanonicalRecord;
use serde::{Deserialize, Serialize};

/// Denominator strategy for the engagement rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementPolicy {
    /// Floor the denominator at one by adding one to the view count
    PlusOneDenominator,
    /// Divide by views and drop records whose view count is zero
    PositiveViewsDenominator,
}

impl EngagementPolicy {
    /// Whether the record carries a usable denominator under this policy
    pub fn admits(&self, record: &CanonicalRecord) -> bool {
        match self {
            EngagementPolicy::PlusOneDenominator => true,
            EngagementPolicy::PositiveViewsDenominator => record.views > 0,
        }
    }

    /// Compute the engagement rate, or `None` if the record must be dropped
    pub fn rate(&self, record: &CanonicalRecord) -> Option<f64> {
        if !self.admits(record) {
            return None;
        }

        let rate = match self {
            EngagementPolicy::PlusOneDenominator => {
                let interactions = record.likes as f64 + record.comments as f64;
                interactions / (record.views as f64 + 1.0)
            }
            EngagementPolicy::PositiveViewsDenominator => {
                let interactions = record.likes as f64
                    + record.comments as f64
                    + record.shares.unwrap_or(0) as f64;
                interactions / record.views as f64
            }
        };

        // Guard only; u64 counters converted to f64 stay finite
        rate.is_finite().then_some(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(likes: u64, comments: u64, shares: Option<u64>, views: u64) -> CanonicalRecord {
        CanonicalRecord {
            likes,
            comments,
            shares,
            views,
            ..Default::default()
        }
    }

    #[test]
    fn test_plus_one_keeps_zero_views() {
        let record = counters(10, 5, None, 0);
        let rate = EngagementPolicy::PlusOneDenominator.rate(&record);
        assert_eq!(rate, Some(15.0));
    }

    #[test]
    fn test_plus_one_with_views() {
        let record = counters(90, 9, None, 98);
        let rate = EngagementPolicy::PlusOneDenominator.rate(&record).unwrap();
        assert!((rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_positive_views_drops_zero_views() {
        let record = counters(10, 5, Some(3), 0);
        assert!(!EngagementPolicy::PositiveViewsDenominator.admits(&record));
        assert_eq!(EngagementPolicy::PositiveViewsDenominator.rate(&record), None);
    }

    #[test]
    fn test_positive_views_counts_shares() {
        let record = counters(10, 5, Some(5), 100);
        let rate = EngagementPolicy::PositiveViewsDenominator.rate(&record).unwrap();
        assert!((rate - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_rates_are_finite_and_non_negative() {
        let records = [
            counters(0, 0, None, 0),
            counters(u64::MAX, u64::MAX, Some(u64::MAX), 1),
            counters(1, 0, Some(0), u64::MAX),
        ];
        for policy in [
            EngagementPolicy::PlusOneDenominator,
            EngagementPolicy::PositiveViewsDenominator,
        ] {
            for record in &records {
                if let Some(rate) = policy.rate(record) {
                    assert!(rate.is_finite());
                    assert!(rate >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_max_counters_are_not_dropped() {
        let record = counters(u64::MAX, u64::MAX, Some(u64::MAX), 1);
        assert!(EngagementPolicy::PositiveViewsDenominator.rate(&record).is_some());
        assert!(EngagementPolicy::PlusOneDenominator.rate(&record).is_some());
    }
}
