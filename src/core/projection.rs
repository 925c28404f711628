//! Derived-field projections.
//!
//! Several stored columns are caches of other records:
//!
//! | column                     | source                                        |
//! |----------------------------|-----------------------------------------------|
//! | `donors.total_donated`     | sum of the donor's Completed donations         |
//! | `donors.last_donation`     | latest date of the donor's Completed donations |
//! | `campaigns.raised_amount`  | sum of the campaign's Completed donations      |
//! | `events.attendees`         | attendance records with `attended = true`      |
//!
//! Every write that can change a source calls the matching `refresh_*` function
//! on the same connection, inside the same transaction, before committing.
//! [`recalculate_all`] rebuilds all of them at once and is safe to run any
//! number of times.

use crate::{
    entities::{
        Campaign, Donation, Donor, Event, EventAttendance, campaign, donation, donor, event,
        event_attendance,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

const AMOUNT_TOLERANCE: f64 = 1e-6;

fn amounts_differ(a: f64, b: f64) -> bool {
    (a - b).abs() > AMOUNT_TOLERANCE
}

/// Derived donor fields computed from donation rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonorProjection {
    /// Sum of Completed amounts
    pub total_donated: f64,
    /// Latest Completed donation date
    pub last_donation: Option<DateTime<Utc>>,
}

impl DonorProjection {
    /// Computes the projection, ignoring every donation that is not Completed.
    pub fn from_donations<'a, I>(donations: I) -> Self
    where
        I: IntoIterator<Item = &'a donation::Model>,
    {
        donations
            .into_iter()
            .filter(|d| d.is_completed())
            .fold(
                Self {
                    total_donated: 0.0,
                    last_donation: None,
                },
                |acc, d| Self {
                    total_donated: acc.total_donated + d.amount,
                    last_donation: acc.last_donation.max(Some(d.donation_date)),
                },
            )
    }

    /// Whether the stored donor row already holds these values.
    #[must_use]
    pub fn matches(&self, donor: &donor::Model) -> bool {
        !amounts_differ(self.total_donated, donor.total_donated)
            && self.last_donation == donor.last_donation
    }
}

/// Sum of the Completed amounts among `donations`.
pub fn completed_total<'a, I>(donations: I) -> f64
where
    I: IntoIterator<Item = &'a donation::Model>,
{
    donations
        .into_iter()
        .filter(|d| d.is_completed())
        .map(|d| d.amount)
        .sum()
}

/// Recomputes `total_donated` and `last_donation` for one donor.
#[instrument(skip(conn))]
pub async fn refresh_donor<C>(conn: &C, donor_id: i64) -> Result<donor::Model>
where
    C: ConnectionTrait,
{
    let donor = Donor::find_by_id(donor_id)
        .one(conn)
        .await?
        .ok_or(Error::DonorNotFound { id: donor_id })?;

    let donations = Donation::find()
        .filter(donation::Column::DonorId.eq(donor_id))
        .filter(donation::Column::Status.eq(donation::DonationStatus::Completed))
        .all(conn)
        .await?;

    let projection = DonorProjection::from_donations(&donations);
    debug!(
        total = projection.total_donated,
        last = ?projection.last_donation,
        "Refreshing donor projection"
    );

    let mut active_model: donor::ActiveModel = donor.into();
    active_model.total_donated = Set(projection.total_donated);
    active_model.last_donation = Set(projection.last_donation);
    active_model.update(conn).await.map_err(Into::into)
}

/// Recomputes `raised_amount` for one campaign.
#[instrument(skip(conn))]
pub async fn refresh_campaign<C>(conn: &C, campaign_id: i64) -> Result<campaign::Model>
where
    C: ConnectionTrait,
{
    let campaign = Campaign::find_by_id(campaign_id)
        .one(conn)
        .await?
        .ok_or(Error::CampaignNotFound { id: campaign_id })?;

    let donations = Donation::find()
        .filter(donation::Column::CampaignId.eq(campaign_id))
        .filter(donation::Column::Status.eq(donation::DonationStatus::Completed))
        .all(conn)
        .await?;

    let mut active_model: campaign::ActiveModel = campaign.into();
    active_model.raised_amount = Set(completed_total(&donations));
    active_model.update(conn).await.map_err(Into::into)
}

/// Recomputes `attendees` for one event.
#[instrument(skip(conn))]
pub async fn refresh_event<C>(conn: &C, event_id: i64) -> Result<event::Model>
where
    C: ConnectionTrait,
{
    let event = Event::find_by_id(event_id)
        .one(conn)
        .await?
        .ok_or(Error::EventNotFound { id: event_id })?;

    let attended = EventAttendance::find()
        .filter(event_attendance::Column::EventId.eq(event_id))
        .filter(event_attendance::Column::Attended.eq(true))
        .count(conn)
        .await?;

    let mut active_model: event::ActiveModel = event.into();
    active_model.attendees = Set(i64::try_from(attended)?);
    active_model.update(conn).await.map_err(Into::into)
}

/// Outcome of a full projection rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationReport {
    /// Donors examined
    pub donors_checked: usize,
    /// Donors whose stored projection was wrong and got rewritten
    pub donors_updated: usize,
    /// Campaigns examined
    pub campaigns_checked: usize,
    /// Campaigns whose `raised_amount` got rewritten
    pub campaigns_updated: usize,
    /// Events examined
    pub events_checked: usize,
    /// Events whose `attendees` got rewritten
    pub events_updated: usize,
}

impl RecalculationReport {
    /// Total number of rows rewritten.
    #[must_use]
    pub const fn rows_updated(&self) -> usize {
        self.donors_updated + self.campaigns_updated + self.events_updated
    }
}

/// Rebuilds every projection from source rows in a single transaction.
///
/// Only rows whose stored value differs are written, so a second run on a
/// consistent database updates nothing.
pub async fn recalculate_all(db: &DatabaseConnection) -> Result<RecalculationReport> {
    let txn = db.begin().await?;
    let mut report = RecalculationReport::default();

    let donations = Donation::find().all(&txn).await?;

    let mut by_donor: BTreeMap<i64, Vec<&donation::Model>> = BTreeMap::new();
    let mut by_campaign: BTreeMap<i64, Vec<&donation::Model>> = BTreeMap::new();
    for d in &donations {
        by_donor.entry(d.donor_id).or_default().push(d);
        if let Some(campaign_id) = d.campaign_id {
            by_campaign.entry(campaign_id).or_default().push(d);
        }
    }

    for donor in Donor::find().all(&txn).await? {
        report.donors_checked += 1;
        let projection = DonorProjection::from_donations(
            by_donor.get(&donor.id).into_iter().flatten().copied(),
        );
        if projection.matches(&donor) {
            continue;
        }

        let mut active_model: donor::ActiveModel = donor.into();
        active_model.total_donated = Set(projection.total_donated);
        active_model.last_donation = Set(projection.last_donation);
        active_model.update(&txn).await?;
        report.donors_updated += 1;
    }

    for campaign in Campaign::find().all(&txn).await? {
        report.campaigns_checked += 1;
        let raised = completed_total(by_campaign.get(&campaign.id).into_iter().flatten().copied());
        if !amounts_differ(raised, campaign.raised_amount) {
            continue;
        }

        let mut active_model: campaign::ActiveModel = campaign.into();
        active_model.raised_amount = Set(raised);
        active_model.update(&txn).await?;
        report.campaigns_updated += 1;
    }

    let mut attended_by_event: BTreeMap<i64, i64> = BTreeMap::new();
    for record in EventAttendance::find()
        .filter(event_attendance::Column::Attended.eq(true))
        .all(&txn)
        .await?
    {
        *attended_by_event.entry(record.event_id).or_insert(0) += 1;
    }

    for event in Event::find().all(&txn).await? {
        report.events_checked += 1;
        let attendees = attended_by_event.get(&event.id).copied().unwrap_or(0);
        if attendees == event.attendees {
            continue;
        }

        let mut active_model: event::ActiveModel = event.into();
        active_model.attendees = Set(attendees);
        active_model.update(&txn).await?;
        report.events_updated += 1;
    }

    txn.commit().await?;

    info!(
        donors_updated = report.donors_updated,
        campaigns_updated = report.campaigns_updated,
        events_updated = report.events_updated,
        "Projection rebuild complete"
    );
    Ok(report)
}
