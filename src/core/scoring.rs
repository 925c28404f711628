//! Lapse-risk and giving-frequency scoring.
//!
//! Both scores are pure functions of their inputs. The current time is always
//! passed in as `now`; nothing in this module reads the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days without a Completed gift at which a donor becomes [`RiskLevel::Medium`].
pub const MEDIUM_RISK_DAYS: i64 = 90;
/// Days without a Completed gift at which a donor becomes [`RiskLevel::High`].
pub const HIGH_RISK_DAYS: i64 = 180;
/// Days without a Completed gift at which a donor becomes [`RiskLevel::Critical`].
pub const CRITICAL_RISK_DAYS: i64 = 365;

const SECONDS_PER_DAY: i64 = 86_400;

/// How likely a donor is to have lapsed, ordered from least to most at risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Has never made a qualifying gift
    New,
    /// Gave within the last 90 days
    Low,
    /// Last gift 90 to 179 days ago
    Medium,
    /// Last gift 180 to 364 days ago
    High,
    /// Last gift a year or more ago
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::New => "New",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Result of scoring a donor's lapse risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Risk category
    pub level: RiskLevel,
    /// Whole days since the last qualifying gift; `None` for new donors
    pub days_since_last_gift: Option<i64>,
}

/// Whole days elapsed from `then` to `now`, rounded down.
#[must_use]
pub fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Maps days since the last gift onto a risk category.
///
/// Each threshold belongs to the higher category: 89 days is `Low`, 90 is `Medium`.
#[must_use]
pub const fn risk_for_days(days: i64) -> RiskLevel {
    if days < MEDIUM_RISK_DAYS {
        RiskLevel::Low
    } else if days < HIGH_RISK_DAYS {
        RiskLevel::Medium
    } else if days < CRITICAL_RISK_DAYS {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Scores a donor from the date of their last Completed gift.
///
/// A donor with no last gift, or who has given nothing in total, is `New`.
#[must_use]
pub fn assess_risk(
    last_gift: Option<DateTime<Utc>>,
    has_qualifying_activity: bool,
    now: DateTime<Utc>,
) -> RiskAssessment {
    match last_gift {
        Some(last) if has_qualifying_activity => {
            let days = days_between(last, now);
            RiskAssessment {
                level: risk_for_days(days),
                days_since_last_gift: Some(days),
            }
        }
        _ => RiskAssessment {
            level: RiskLevel::New,
            days_since_last_gift: None,
        },
    }
}

/// Giving cadence inferred from the gaps between a donor's gifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GivingFrequency {
    /// Fewer than two gifts
    #[serde(rename = "New donor")]
    New,
    /// Average gap of 30 days or less
    #[serde(rename = "Monthly donor")]
    Monthly,
    /// Average gap of 90 days or less
    #[serde(rename = "Quarterly donor")]
    Quarterly,
    /// Average gap of 180 days or less
    #[serde(rename = "Semi-annual donor")]
    SemiAnnual,
    /// Average gap of 365 days or less
    #[serde(rename = "Annual donor")]
    Annual,
    /// Average gap above a year
    #[serde(rename = "Infrequent donor")]
    Infrequent,
}

impl GivingFrequency {
    /// Display label, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New donor",
            Self::Monthly => "Monthly donor",
            Self::Quarterly => "Quarterly donor",
            Self::SemiAnnual => "Semi-annual donor",
            Self::Annual => "Annual donor",
            Self::Infrequent => "Infrequent donor",
        }
    }

    /// Classifies an average gap in days.
    #[must_use]
    pub fn from_average_gap(average_days: f64) -> Self {
        if average_days <= 30.0 {
            Self::Monthly
        } else if average_days <= 90.0 {
            Self::Quarterly
        } else if average_days <= 180.0 {
            Self::SemiAnnual
        } else if average_days <= 365.0 {
            Self::Annual
        } else {
            Self::Infrequent
        }
    }
}

impl fmt::Display for GivingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Average gap in whole days between consecutive gifts, newest first.
///
/// Returns `None` with fewer than two dates. Input order does not matter.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_gap_days(dates: &[DateTime<Utc>]) -> Option<f64> {
    if dates.len() < 2 {
        return None;
    }

    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let gaps: Vec<i64> = sorted
        .windows(2)
        .map(|pair| days_between(pair[1], pair[0]))
        .collect();

    // Gap counts are tiny; the cast cannot lose precision in practice.
    Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64)
}

/// Labels a donor's giving cadence from their gift dates.
#[must_use]
pub fn giving_frequency(dates: &[DateTime<Utc>]) -> GivingFrequency {
    average_gap_days(dates).map_or(GivingFrequency::New, GivingFrequency::from_average_gap)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::utc;
    use chrono::Duration;

    fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        now - Duration::days(days)
    }

    #[test]
    fn test_risk_boundaries() {
        let now = utc(2025, 6, 30);
        let level = |days| assess_risk(Some(days_ago(now, days)), true, now).level;

        assert_eq!(level(0), RiskLevel::Low);
        assert_eq!(level(89), RiskLevel::Low);
        assert_eq!(level(90), RiskLevel::Medium);
        assert_eq!(level(179), RiskLevel::Medium);
        assert_eq!(level(180), RiskLevel::High);
        assert_eq!(level(364), RiskLevel::High);
        assert_eq!(level(365), RiskLevel::Critical);
        assert_eq!(level(2000), RiskLevel::Critical);
    }

    #[test]
    fn test_days_are_floored() {
        let now = utc(2025, 6, 30);
        let almost_ninety = now - Duration::days(90) + Duration::seconds(1);
        assert_eq!(days_between(almost_ninety, now), 89);
        assert_eq!(
            assess_risk(Some(almost_ninety), true, now).level,
            RiskLevel::Low
        );
    }

    #[test]
    fn test_risk_is_monotonic_in_days() {
        let mut previous = risk_for_days(0);
        for days in 1..=800 {
            let current = risk_for_days(days);
            assert!(previous <= current, "risk decreased at {days} days");
            previous = current;
        }
    }

    #[test]
    fn test_new_donor_is_never_critical() {
        let now = utc(2025, 6, 30);
        let assessment = assess_risk(None, false, now);
        assert_eq!(assessment.level, RiskLevel::New);
        assert_eq!(assessment.days_since_last_gift, None);

        // A stale date with nothing actually given still scores New
        let assessment = assess_risk(Some(utc(2019, 1, 1)), false, now);
        assert_eq!(assessment.level, RiskLevel::New);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::New < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_assessment_serializes_camel_case() {
        let now = utc(2025, 6, 30);
        let json = serde_json::to_value(assess_risk(Some(days_ago(now, 10)), true, now)).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({ "level": "Low", "daysSinceLastGift": 10 }))
        );
    }

    #[test]
    fn test_frequency_needs_two_gifts() {
        assert_eq!(giving_frequency(&[]), GivingFrequency::New);
        assert_eq!(giving_frequency(&[utc(2024, 1, 1)]), GivingFrequency::New);
    }

    #[test]
    fn test_frequency_labels() {
        let monthly = [utc(2024, 1, 1), utc(2024, 1, 31), utc(2024, 3, 1)];
        assert_eq!(giving_frequency(&monthly), GivingFrequency::Monthly);

        let quarterly = [utc(2024, 1, 1), utc(2024, 3, 1)];
        assert_eq!(giving_frequency(&quarterly), GivingFrequency::Quarterly);

        let semi_annual = [utc(2024, 1, 1), utc(2024, 6, 1)];
        assert_eq!(giving_frequency(&semi_annual), GivingFrequency::SemiAnnual);

        let annual = [utc(2023, 1, 1), utc(2024, 1, 1)];
        assert_eq!(giving_frequency(&annual), GivingFrequency::Annual);

        let infrequent = [utc(2020, 1, 1), utc(2024, 1, 1)];
        assert_eq!(giving_frequency(&infrequent), GivingFrequency::Infrequent);
    }

    #[test]
    fn test_frequency_threshold_is_inclusive() {
        // Exactly 30 days apart is still monthly
        let dates = [utc(2024, 4, 1), utc(2024, 5, 1)];
        assert_eq!(average_gap_days(&dates), Some(30.0));
        assert_eq!(giving_frequency(&dates), GivingFrequency::Monthly);
    }

    #[test]
    fn test_frequency_ignores_input_order() {
        let ascending = [utc(2024, 1, 1), utc(2024, 2, 1), utc(2024, 3, 1)];
        let shuffled = [utc(2024, 2, 1), utc(2024, 3, 1), utc(2024, 1, 1)];
        assert_eq!(average_gap_days(&ascending), average_gap_days(&shuffled));
    }

    #[test]
    fn test_frequency_serializes_as_label() {
        let json = serde_json::to_value(GivingFrequency::SemiAnnual).ok();
        assert_eq!(json, Some(serde_json::json!("Semi-annual donor")));
        assert_eq!(GivingFrequency::Annual.to_string(), "Annual donor");
    }
}
