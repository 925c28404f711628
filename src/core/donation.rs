//! Donation business logic - recording gifts and keeping projections current.
//!
//! Every write here runs inside a transaction that also refreshes the donor's
//! `total_donated`/`last_donation` and, when the gift is attributed to a
//! campaign, the campaign's `raised_amount`. A caller never observes a donation
//! without its projections.

use crate::{
    core::projection,
    entities::{
        Campaign, Donation, Donor, Event, donation,
        donation::{Attribution, DonationStatus},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Input for recording a donation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    /// Donor who gave
    pub donor_id: i64,
    /// Amount given, in dollars
    pub amount: f64,
    /// When the gift was made
    pub donation_date: DateTime<Utc>,
    /// Lifecycle state; defaults to Completed
    #[serde(default)]
    pub status: DonationStatus,
    /// Campaign or event the gift was given toward
    #[serde(default)]
    pub attribution: Attribution,
    /// Whether the gift belongs to a recurring pledge
    #[serde(default)]
    pub is_recurring: bool,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

async fn ensure_attribution_exists(txn: &DatabaseTransaction, attribution: Attribution) -> Result<()> {
    match attribution {
        Attribution::Unattributed => {}
        Attribution::Campaign(id) => {
            Campaign::find_by_id(id)
                .one(txn)
                .await?
                .ok_or(Error::CampaignNotFound { id })?;
        }
        Attribution::Event(id) => {
            Event::find_by_id(id)
                .one(txn)
                .await?
                .ok_or(Error::EventNotFound { id })?;
        }
    }
    Ok(())
}

/// Refreshes every projection a donation row feeds.
async fn refresh_for(txn: &DatabaseTransaction, donation: &donation::Model) -> Result<()> {
    projection::refresh_donor(txn, donation.donor_id).await?;
    if let Some(campaign_id) = donation.attribution()?.campaign_id() {
        projection::refresh_campaign(txn, campaign_id).await?;
    }
    Ok(())
}

/// Records a donation and refreshes the projections it affects.
///
/// # Errors
/// * [`Error::InvalidAmount`] if the amount is negative, NaN or infinite
/// * [`Error::DonorNotFound`] if the donor does not exist
/// * [`Error::CampaignNotFound`] / [`Error::EventNotFound`] if the attribution
///   target does not exist
#[instrument(skip(db, new_donation), fields(donor_id = new_donation.donor_id))]
pub async fn create_donation(
    db: &DatabaseConnection,
    new_donation: NewDonation,
) -> Result<donation::Model> {
    validate_amount(new_donation.amount)?;

    let txn = db.begin().await?;

    Donor::find_by_id(new_donation.donor_id)
        .one(&txn)
        .await?
        .ok_or(Error::DonorNotFound {
            id: new_donation.donor_id,
        })?;
    ensure_attribution_exists(&txn, new_donation.attribution).await?;

    let donation = donation::ActiveModel {
        donor_id: Set(new_donation.donor_id),
        amount: Set(new_donation.amount),
        donation_date: Set(new_donation.donation_date),
        status: Set(new_donation.status),
        campaign_id: Set(new_donation.attribution.campaign_id()),
        event_id: Set(new_donation.attribution.event_id()),
        is_recurring: Set(new_donation.is_recurring),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    refresh_for(&txn, &donation).await?;
    txn.commit().await?;

    info!(
        donation_id = donation.id,
        amount = donation.amount,
        status = ?donation.status,
        "Recorded donation"
    );
    Ok(donation)
}

/// Retrieves a donation by id.
pub async fn get_donation_by_id(
    db: &DatabaseConnection,
    donation_id: i64,
) -> Result<Option<donation::Model>> {
    Donation::find_by_id(donation_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a donor's donations, newest first.
pub async fn list_donations_for_donor(
    db: &DatabaseConnection,
    donor_id: i64,
) -> Result<Vec<donation::Model>> {
    Donation::find()
        .filter(donation::Column::DonorId.eq(donor_id))
        .order_by_desc(donation::Column::DonationDate)
        .order_by_desc(donation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a donation's status and refreshes the projections it affects.
///
/// Moving a gift into or out of Completed changes the donor and campaign
/// totals, so both are recomputed in the same transaction.
#[instrument(skip(db))]
pub async fn update_donation_status(
    db: &DatabaseConnection,
    donation_id: i64,
    status: DonationStatus,
) -> Result<donation::Model> {
    let txn = db.begin().await?;

    let existing = Donation::find_by_id(donation_id)
        .one(&txn)
        .await?
        .ok_or(Error::DonationNotFound { id: donation_id })?;
    let previous = existing.status;

    let mut active_model: donation::ActiveModel = existing.into();
    active_model.status = Set(status);
    let updated = active_model.update(&txn).await?;

    refresh_for(&txn, &updated).await?;
    txn.commit().await?;

    info!(donation_id, from = ?previous, to = ?status, "Updated donation status");
    Ok(updated)
}

/// Deletes a donation and refreshes the projections it fed.
#[instrument(skip(db))]
pub async fn delete_donation(db: &DatabaseConnection, donation_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Donation::find_by_id(donation_id)
        .one(&txn)
        .await?
        .ok_or(Error::DonationNotFound { id: donation_id })?;

    existing.clone().delete(&txn).await?;
    refresh_for(&txn, &existing).await?;
    txn.commit().await?;

    info!(donation_id, "Deleted donation");
    Ok(())
}
