//! Shared test utilities.
//!
//! This module provides helpers for setting up an in-memory database, creating
//! records with sensible defaults, and building plain models for the pure
//! aggregation and scoring tests.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        campaign, donation, donor, event,
        gateway::{
            CampaignWithDonations, DashboardGateway, DonationWithDonor, EntityKind, GiftStats,
        },
    },
    entities::{
        self,
        donation::{Attribution, DonationStatus},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Midnight UTC on the given calendar date.
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Builds an unsaved Completed donation model.
pub fn completed_donation(
    id: i64,
    donor_id: i64,
    amount: f64,
    date: DateTime<Utc>,
) -> entities::donation::Model {
    donation_with_status(id, donor_id, amount, date, DonationStatus::Completed)
}

/// Builds an unsaved donation model with the given status.
pub fn donation_with_status(
    id: i64,
    donor_id: i64,
    amount: f64,
    date: DateTime<Utc>,
    status: DonationStatus,
) -> entities::donation::Model {
    entities::donation::Model {
        id,
        donor_id,
        amount,
        donation_date: date,
        status,
        campaign_id: None,
        event_id: None,
        is_recurring: false,
    }
}

/// Builds an unsaved donor model with empty projections.
pub fn donor_model(
    id: i64,
    first_name: &str,
    last_name: &str,
    created_at: DateTime<Utc>,
) -> entities::donor::Model {
    entities::donor::Model {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.org", first_name.to_lowercase()),
        created_at,
        total_donated: 0.0,
        last_donation: None,
    }
}

/// Creates a test donor with sensible defaults.
///
/// # Defaults
/// * `email`: `"<first>@example.org"`
/// * `created_at`: 2024-01-01
pub async fn create_test_donor(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
) -> Result<entities::donor::Model> {
    create_custom_donor(db, first_name, last_name, utc(2024, 1, 1)).await
}

/// Creates a test donor with a custom creation date.
pub async fn create_custom_donor(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
    created_at: DateTime<Utc>,
) -> Result<entities::donor::Model> {
    donor::create_donor(
        db,
        donor::NewDonor {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}@example.org", first_name.to_lowercase()),
        },
        created_at,
    )
    .await
}

/// Creates an active test campaign.
pub async fn create_test_campaign(
    db: &DatabaseConnection,
    name: &str,
    goal_amount: Option<f64>,
) -> Result<entities::campaign::Model> {
    campaign::create_campaign(
        db,
        campaign::NewCampaign {
            name: name.to_string(),
            goal_amount,
            status: entities::campaign::CampaignStatus::Active,
        },
    )
    .await
}

/// Creates a test event dated 2024-09-01.
pub async fn create_test_event(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::event::Model> {
    event::create_event(
        db,
        event::NewEvent {
            name: name.to_string(),
            event_date: utc(2024, 9, 1),
        },
    )
    .await
}

/// Records a Completed, unattributed gift.
pub async fn create_test_gift(
    db: &DatabaseConnection,
    donor_id: i64,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<entities::donation::Model> {
    create_custom_gift(
        db,
        donor_id,
        amount,
        date,
        DonationStatus::Completed,
        Attribution::Unattributed,
    )
    .await
}

/// Records a gift with custom status and attribution.
pub async fn create_custom_gift(
    db: &DatabaseConnection,
    donor_id: i64,
    amount: f64,
    date: DateTime<Utc>,
    status: DonationStatus,
    attribution: Attribution,
) -> Result<entities::donation::Model> {
    donation::create_donation(
        db,
        donation::NewDonation {
            donor_id,
            amount,
            donation_date: date,
            status,
            attribution,
            is_recurring: false,
        },
    )
    .await
}

/// Sets up a database with one donor.
/// Returns (db, donor) for common test scenarios.
pub async fn setup_with_donor() -> Result<(DatabaseConnection, entities::donor::Model)> {
    let db = setup_test_db().await?;
    let donor = create_test_donor(&db, "Ada", "Lovelace").await?;
    Ok((db, donor))
}

/// In-memory [`DashboardGateway`] for exercising the composition without a
/// database. Stats and filters are computed the way the SQL queries compute
/// them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    /// Donors, in id order
    pub donors: Vec<entities::donor::Model>,
    /// Every donation, of any status
    pub donations: Vec<entities::donation::Model>,
    /// Campaigns
    pub campaigns: Vec<entities::campaign::Model>,
    /// Number of events
    pub events: u64,
}

impl InMemoryGateway {
    fn completed(&self) -> impl Iterator<Item = &entities::donation::Model> {
        self.donations.iter().filter(|d| d.is_completed())
    }
}

impl DashboardGateway for InMemoryGateway {
    async fn count(&self, kind: EntityKind) -> Result<u64> {
        let count = match kind {
            EntityKind::Donors => self.donors.len(),
            EntityKind::Donations => self.donations.len(),
            EntityKind::Campaigns => self.campaigns.len(),
            EntityKind::Events => return Ok(self.events),
        };
        Ok(u64::try_from(count)?)
    }

    #[allow(clippy::cast_precision_loss)]
    async fn completed_gift_stats(&self) -> Result<GiftStats> {
        let amounts: Vec<f64> = self.completed().map(|d| d.amount).collect();
        if amounts.is_empty() {
            return Ok(GiftStats::default());
        }
        let total: f64 = amounts.iter().sum();
        Ok(GiftStats {
            total,
            average: total / amounts.len() as f64,
        })
    }

    async fn recent_donations(&self, limit: u64) -> Result<Vec<DonationWithDonor>> {
        let mut donations = self.donations.clone();
        donations.sort_by(|a, b| {
            b.donation_date
                .cmp(&a.donation_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        donations
            .into_iter()
            .take(usize::try_from(limit)?)
            .map(|donation| {
                let donor = self
                    .donors
                    .iter()
                    .find(|d| d.id == donation.donor_id)
                    .cloned()
                    .ok_or(Error::InvalidRecord {
                        id: donation.id,
                        field: "donor_id",
                    })?;
                let campaign = donation
                    .campaign_id
                    .and_then(|id| self.campaigns.iter().find(|c| c.id == id).cloned());
                Ok(DonationWithDonor {
                    donation,
                    donor,
                    campaign,
                })
            })
            .collect()
    }

    async fn completed_donations(
        &self,
        donor_id: Option<i64>,
    ) -> Result<Vec<entities::donation::Model>> {
        let mut donations: Vec<_> = self
            .completed()
            .filter(|d| donor_id.is_none_or(|id| d.donor_id == id))
            .cloned()
            .collect();
        donations.sort_by(|a, b| {
            a.donation_date
                .cmp(&b.donation_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(donations)
    }

    async fn donors(&self) -> Result<Vec<entities::donor::Model>> {
        Ok(self.donors.clone())
    }

    async fn donor(&self, donor_id: i64) -> Result<Option<entities::donor::Model>> {
        Ok(self.donors.iter().find(|d| d.id == donor_id).cloned())
    }

    async fn campaigns_with_donations(&self) -> Result<Vec<CampaignWithDonations>> {
        Ok(self
            .campaigns
            .iter()
            .map(|campaign| CampaignWithDonations {
                campaign: campaign.clone(),
                donations: self
                    .donations
                    .iter()
                    .filter(|d| d.campaign_id == Some(campaign.id))
                    .cloned()
                    .collect(),
            })
            .collect())
    }
}

/// Gateway whose every read fails, for checking that compositions abort.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGateway;

fn unavailable<T>() -> Result<T> {
    Err(Error::Database(sea_orm::DbErr::Custom(
        "gateway unavailable".to_string(),
    )))
}

impl DashboardGateway for FailingGateway {
    async fn count(&self, _kind: EntityKind) -> Result<u64> {
        unavailable()
    }

    async fn completed_gift_stats(&self) -> Result<GiftStats> {
        unavailable()
    }

    async fn recent_donations(&self, _limit: u64) -> Result<Vec<DonationWithDonor>> {
        unavailable()
    }

    async fn completed_donations(
        &self,
        _donor_id: Option<i64>,
    ) -> Result<Vec<entities::donation::Model>> {
        unavailable()
    }

    async fn donors(&self) -> Result<Vec<entities::donor::Model>> {
        unavailable()
    }

    async fn donor(&self, _donor_id: i64) -> Result<Option<entities::donor::Model>> {
        unavailable()
    }

    async fn campaigns_with_donations(&self) -> Result<Vec<CampaignWithDonations>> {
        unavailable()
    }
}

/// Builds an unsaved active campaign model.
pub fn campaign_model(id: i64, name: &str, goal_amount: Option<f64>) -> entities::campaign::Model {
    entities::campaign::Model {
        id,
        name: name.to_string(),
        goal_amount,
        raised_amount: 0.0,
        status: entities::campaign::CampaignStatus::Active,
    }
}
