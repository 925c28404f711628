//! Dashboard payload composition.
//!
//! [`get_dashboard_data`] reads everything it needs through a
//! [`DashboardGateway`] into a [`DashboardSnapshot`], then hands the snapshot
//! to [`compose_dashboard`], which performs no I/O. If any read fails the
//! whole request fails; there is no partial payload.
//!
//! All money figures (totals, averages, top donors, campaign raised amounts and
//! every trend series) count Completed donations only. `totalDonations` and the
//! recent-donations list include every status.

use crate::{
    config::settings::DashboardSettings,
    core::{
        aggregation::{self, MonthlyBucket, MonthlyCount, YearlyBucket},
        gateway::{CampaignWithDonations, DashboardGateway, DonationWithDonor, EntityKind, GiftStats},
        projection,
    },
    entities::{campaign::CampaignStatus, donation, donor},
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// Headline counts and amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Donor rows
    pub total_donors: u64,
    /// Donation rows of any status
    pub total_donations: u64,
    /// Campaign rows
    pub total_campaigns: u64,
    /// Event rows
    pub total_events: u64,
    /// Sum of Completed amounts
    pub total_amount: f64,
    /// Rounded to cents
    pub average_gift: f64,
}

/// Donor fields shown next to a recent donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRef {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
}

/// Campaign fields shown next to a recent donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignRef {
    /// Display name
    pub name: String,
}

/// One row of the recent-donations list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDonation {
    /// Record id
    pub id: i64,
    /// Amount given
    pub amount: f64,
    /// When the gift was made
    pub donation_date: DateTime<Utc>,
    /// Who gave
    pub donor: DonorRef,
    /// `null` when the donation is not attributed to a campaign
    pub campaign: Option<CampaignRef>,
}

impl From<DonationWithDonor> for RecentDonation {
    fn from(row: DonationWithDonor) -> Self {
        Self {
            id: row.donation.id,
            amount: row.donation.amount,
            donation_date: row.donation.donation_date,
            donor: DonorRef {
                first_name: row.donor.first_name,
                last_name: row.donor.last_name,
                email: row.donor.email,
            },
            campaign: row.campaign.map(|c| CampaignRef { name: c.name }),
        }
    }
}

/// One entry of the top-donor ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDonor {
    /// Record id
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Sum of Completed amounts
    pub total_donated: f64,
    /// Number of Completed gifts
    pub donation_count: u64,
}

/// Goal versus raised for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPerformance {
    /// Record id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Fundraising target, if any
    pub goal_amount: Option<f64>,
    /// Sum of linked Completed amounts
    pub raised: f64,
    /// Distinct donors with a Completed gift to the campaign
    pub donor_count: u64,
    /// Current state
    pub status: CampaignStatus,
}

/// A raw point in the recent-days trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Amount given
    pub amount: f64,
    /// When the gift was made
    pub donation_date: DateTime<Utc>,
}

/// The complete dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    /// Headline figures
    pub summary: Summary,
    /// Latest donations, newest first
    pub recent_donations: Vec<RecentDonation>,
    /// Highest-giving donors
    pub top_donors: Vec<TopDonor>,
    /// One row per campaign
    pub campaign_performance: Vec<CampaignPerformance>,
    /// Completed gifts in the recent-days window, oldest first
    pub donation_trends: Vec<TrendPoint>,
    /// Monthly totals over the trailing window
    pub donation_trends_monthly: Vec<MonthlyBucket>,
    /// Yearly totals over the whole history
    pub donation_trends_yearly: Vec<YearlyBucket>,
    /// New donors per month over the trailing window
    pub donor_growth: Vec<MonthlyCount>,
}

/// Row counts read from the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    /// Donor rows
    pub donors: u64,
    /// Donation rows
    pub donations: u64,
    /// Campaign rows
    pub campaigns: u64,
    /// Event rows
    pub events: u64,
}

/// Everything the compositor needs, as read from the gateway.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    /// Row counts
    pub counts: EntityCounts,
    /// Completed sum and average
    pub stats: GiftStats,
    /// Newest first, already limited
    pub recent: Vec<DonationWithDonor>,
    /// All donors, in id order
    pub donors: Vec<donor::Model>,
    /// Completed donations only
    pub completed: Vec<donation::Model>,
    /// Campaigns with linked donations
    pub campaigns: Vec<CampaignWithDonations>,
}

/// Rounds a dollar amount to whole cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Orders donors by total given, highest first, and keeps the first `limit`.
///
/// Equal totals are ordered by ascending id, so ranking an already-ranked list
/// returns it unchanged.
#[must_use]
pub fn rank_top_donors(mut donors: Vec<TopDonor>, limit: usize) -> Vec<TopDonor> {
    donors.sort_by(|a, b| {
        b.total_donated
            .total_cmp(&a.total_donated)
            .then_with(|| a.id.cmp(&b.id))
    });
    donors.truncate(limit);
    donors
}

fn top_donors(donors: &[donor::Model], completed: &[donation::Model], limit: usize) -> Vec<TopDonor> {
    let totals = aggregation::totals_by(completed, |d| Some(d.donor_id));
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for d in completed {
        *counts.entry(d.donor_id).or_insert(0) += 1;
    }

    let candidates = donors
        .iter()
        .filter_map(|donor| {
            let donation_count = counts.get(&donor.id).copied()?;
            Some(TopDonor {
                id: donor.id,
                first_name: donor.first_name.clone(),
                last_name: donor.last_name.clone(),
                email: donor.email.clone(),
                total_donated: totals.get(&donor.id).copied().unwrap_or(0.0),
                donation_count,
            })
        })
        .collect();

    rank_top_donors(candidates, limit)
}

fn campaign_performance(campaigns: &[CampaignWithDonations]) -> Vec<CampaignPerformance> {
    campaigns
        .iter()
        .map(|entry| {
            let completed: Vec<&donation::Model> =
                entry.donations.iter().filter(|d| d.is_completed()).collect();
            let donors: BTreeSet<i64> = completed.iter().map(|d| d.donor_id).collect();
            CampaignPerformance {
                id: entry.campaign.id,
                name: entry.campaign.name.clone(),
                goal_amount: entry.campaign.goal_amount,
                raised: projection::completed_total(completed.iter().copied()),
                donor_count: donors.len() as u64,
                status: entry.campaign.status,
            }
        })
        .collect()
}

fn recent_trend(completed: &[donation::Model], now: DateTime<Utc>, days: i64) -> Vec<TrendPoint> {
    // Windows longer than chrono can represent cover all history
    let since = Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut points: Vec<TrendPoint> = completed
        .iter()
        .filter(|d| d.donation_date >= since)
        .map(|d| TrendPoint {
            amount: d.amount,
            donation_date: d.donation_date,
        })
        .collect();
    points.sort_by_key(|p| p.donation_date);
    points
}

/// Builds the dashboard payload from a snapshot.
///
/// # Errors
/// Returns [`crate::errors::Error::InvalidRecord`] if any record cannot be
/// bucketed.
pub fn compose_dashboard(
    snapshot: DashboardSnapshot,
    now: DateTime<Utc>,
    settings: &DashboardSettings,
) -> Result<DashboardData> {
    // Callers may hand in unfiltered rows; money figures never see them.
    let completed: Vec<donation::Model> = snapshot
        .completed
        .into_iter()
        .filter(donation::Model::is_completed)
        .collect();

    let donation_trends_monthly =
        aggregation::monthly_trend(&completed, now, settings.trend_window_months)?;
    let donation_trends_yearly = aggregation::yearly_totals(&completed)?;
    let donor_growth =
        aggregation::monthly_growth(&snapshot.donors, now, settings.trend_window_months)?;

    let summary = Summary {
        total_donors: snapshot.counts.donors,
        total_donations: snapshot.counts.donations,
        total_campaigns: snapshot.counts.campaigns,
        total_events: snapshot.counts.events,
        total_amount: snapshot.stats.total,
        average_gift: round_cents(snapshot.stats.average),
    };

    Ok(DashboardData {
        summary,
        recent_donations: snapshot.recent.into_iter().map(RecentDonation::from).collect(),
        top_donors: top_donors(&snapshot.donors, &completed, settings.top_donors),
        campaign_performance: campaign_performance(&snapshot.campaigns),
        donation_trends: recent_trend(&completed, now, settings.recent_trend_days),
        donation_trends_monthly,
        donation_trends_yearly,
        donor_growth,
    })
}

/// Reads the snapshot for the dashboard through `gateway`.
pub async fn load_snapshot<G>(gateway: &G, settings: &DashboardSettings) -> Result<DashboardSnapshot>
where
    G: DashboardGateway,
{
    let counts = EntityCounts {
        donors: gateway.count(EntityKind::Donors).await?,
        donations: gateway.count(EntityKind::Donations).await?,
        campaigns: gateway.count(EntityKind::Campaigns).await?,
        events: gateway.count(EntityKind::Events).await?,
    };

    Ok(DashboardSnapshot {
        counts,
        stats: gateway.completed_gift_stats().await?,
        recent: gateway.recent_donations(settings.recent_donations).await?,
        donors: gateway.donors().await?,
        completed: gateway.completed_donations(None).await?,
        campaigns: gateway.campaigns_with_donations().await?,
    })
}

/// Reads through `gateway` and composes the dashboard payload.
#[instrument(skip_all)]
pub async fn get_dashboard_data<G>(
    gateway: &G,
    now: DateTime<Utc>,
    settings: &DashboardSettings,
) -> Result<DashboardData>
where
    G: DashboardGateway,
{
    let snapshot = load_snapshot(gateway, settings).await?;
    debug!(
        donors = snapshot.donors.len(),
        completed = snapshot.completed.len(),
        "Composing dashboard"
    );
    compose_dashboard(snapshot, now, settings)
}
