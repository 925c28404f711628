//! Per-donor insight.
//!
//! [`build_insight`] turns a donor and their Completed gifts into risk,
//! frequency, totals and trends. [`render_summary`] formats that as plain text
//! for when the external writing assistant is unavailable, and
//! [`build_prompt`] assembles the request text sent to it. Neither performs
//! I/O; only [`get_donor_insight`] reads, through a [`DashboardGateway`].

use crate::{
    core::{
        aggregation::{self, MonthlyBucket, YearlyBucket},
        dashboard::round_cents,
        gateway::DashboardGateway,
        scoring::{self, GivingFrequency, RiskAssessment},
    },
    entities::{donation, donor},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use tracing::instrument;

/// Everything the donor insight page shows about one donor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorInsight {
    /// Donor id
    pub donor_id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Lapse risk as of the request time
    pub risk: RiskAssessment,
    /// Giving cadence
    pub frequency: GivingFrequency,
    /// Sum of Completed gifts
    pub total_given: f64,
    /// Number of Completed gifts
    pub gift_count: u64,
    /// Mean Completed gift, rounded to cents
    pub average_gift: f64,
    /// Earliest Completed gift
    pub first_gift: Option<DateTime<Utc>>,
    /// Latest Completed gift
    pub last_gift: Option<DateTime<Utc>>,
    /// Monthly totals over the trailing window, or all time if that is empty
    pub monthly_trend: Vec<MonthlyBucket>,
    /// Yearly totals over the whole history
    pub yearly_trend: Vec<YearlyBucket>,
}

impl DonorInsight {
    /// "First Last"
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Computes a donor's insight from their donations.
///
/// Donations that are not Completed are ignored. A donor whose Completed total
/// is zero scores [`scoring::RiskLevel::New`] however old their gifts are.
#[allow(clippy::cast_precision_loss)]
pub fn build_insight(
    donor: &donor::Model,
    donations: &[donation::Model],
    now: DateTime<Utc>,
    window_months: u32,
) -> Result<DonorInsight> {
    let completed: Vec<donation::Model> = donations
        .iter()
        .filter(|d| d.is_completed() && d.donor_id == donor.id)
        .cloned()
        .collect();

    let dates: Vec<DateTime<Utc>> = completed.iter().map(|d| d.donation_date).collect();
    let total_given: f64 = completed.iter().map(|d| d.amount).sum();
    let gift_count = completed.len();
    let first_gift = dates.iter().min().copied();
    let last_gift = dates.iter().max().copied();

    let average_gift = if gift_count == 0 {
        0.0
    } else {
        round_cents(total_given / gift_count as f64)
    };

    Ok(DonorInsight {
        donor_id: donor.id,
        first_name: donor.first_name.clone(),
        last_name: donor.last_name.clone(),
        email: donor.email.clone(),
        risk: scoring::assess_risk(last_gift, total_given > 0.0, now),
        frequency: scoring::giving_frequency(&dates),
        total_given,
        gift_count: u64::try_from(gift_count)?,
        average_gift,
        first_gift,
        last_gift,
        monthly_trend: aggregation::monthly_trend(&completed, now, window_months)?,
        yearly_trend: aggregation::yearly_totals(&completed)?,
    })
}

/// Reads a donor and their Completed gifts and builds the insight.
#[instrument(skip(gateway))]
pub async fn get_donor_insight<G>(
    gateway: &G,
    donor_id: i64,
    now: DateTime<Utc>,
    window_months: u32,
) -> Result<DonorInsight>
where
    G: DashboardGateway,
{
    let donor = gateway
        .donor(donor_id)
        .await?
        .ok_or(Error::DonorNotFound { id: donor_id })?;
    let donations = gateway.completed_donations(Some(donor_id)).await?;

    build_insight(&donor, &donations, now, window_months)
}

/// Formats the insight as a short plain-text report.
#[must_use]
pub fn render_summary(insight: &DonorInsight) -> String {
    let mut summary = format!("Donor Insight - {}\n", insight.full_name());

    // Writing to a String cannot fail
    let _ = writeln!(
        summary,
        "  Risk: {} | Frequency: {}",
        insight.risk.level, insight.frequency
    );

    if insight.gift_count == 0 {
        let _ = writeln!(summary, "  No completed gifts on record.");
        return summary;
    }

    let _ = writeln!(
        summary,
        "  Given: ${:.2} across {} gifts (average ${:.2})",
        insight.total_given, insight.gift_count, insight.average_gift
    );
    if let (Some(first), Some(last)) = (insight.first_gift, insight.last_gift) {
        let _ = writeln!(
            summary,
            "  First gift: {} | Last gift: {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }
    if let Some(days) = insight.risk.days_since_last_gift {
        let _ = writeln!(summary, "  Days since last gift: {days}");
    }

    for bucket in &insight.yearly_trend {
        let _ = writeln!(summary, "  {}: ${:.2}", bucket.year, bucket.amount);
    }

    summary
}

/// Builds the request text for the external writing assistant.
#[must_use]
pub fn build_prompt(insight: &DonorInsight) -> String {
    let mut prompt = format!(
        "You are assisting a nonprofit development officer. Write a brief, friendly \
         analysis of the donor {} with one recommended next step.\n\n",
        insight.full_name()
    );

    let _ = writeln!(prompt, "Risk level: {}", insight.risk.level);
    let _ = writeln!(prompt, "Giving frequency: {}", insight.frequency);
    let _ = writeln!(prompt, "Total given: ${:.2}", insight.total_given);
    let _ = writeln!(prompt, "Number of gifts: {}", insight.gift_count);
    let _ = writeln!(prompt, "Average gift: ${:.2}", insight.average_gift);
    match insight.last_gift {
        Some(last) => {
            let _ = writeln!(prompt, "Last gift: {}", last.format("%Y-%m-%d"));
        }
        None => {
            let _ = writeln!(prompt, "Last gift: none");
        }
    }

    if !insight.monthly_trend.is_empty() {
        let _ = writeln!(prompt, "Monthly giving:");
        for bucket in &insight.monthly_trend {
            let _ = writeln!(prompt, "- {}: ${:.2}", bucket.month, bucket.amount);
        }
    }

    prompt
}
