//! Read interface for the dashboard and donor insight computations.
//!
//! The computations in [`crate::core::dashboard`] and [`crate::core::insight`]
//! only ever read. They go through [`DashboardGateway`] so that the composition
//! itself stays free of queries and can be exercised against in-memory data.
//! [`SeaOrmGateway`] is the implementation backed by the application database.

use crate::{
    entities::{
        Campaign, Donation, Donor, Event, campaign, donation, donation::DonationStatus, donor,
    },
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, Func},
};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use tracing::instrument;

/// Record types the gateway can count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Donor rows
    Donors,
    /// Donation rows of any status
    Donations,
    /// Campaign rows
    Campaigns,
    /// Event rows
    Events,
}

/// Sum and mean of Completed donation amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GiftStats {
    /// Sum of Completed amounts; zero when there are none
    pub total: f64,
    /// Mean Completed amount, unrounded; zero when there are none
    pub average: f64,
}

/// A donation joined with the donor who gave it and its campaign, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationWithDonor {
    /// The donation row
    pub donation: donation::Model,
    /// Its donor
    pub donor: donor::Model,
    /// Its campaign, when attributed to one
    pub campaign: Option<campaign::Model>,
}

/// A campaign with every donation linked to it, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignWithDonations {
    /// The campaign row
    pub campaign: campaign::Model,
    /// Linked donations
    pub donations: Vec<donation::Model>,
}

/// Read operations the dashboard and insight computations depend on.
///
/// Any failure is returned as-is; callers abort the whole computation rather
/// than produce a partial result.
pub trait DashboardGateway: Sync {
    /// Number of rows of the given kind.
    fn count(&self, kind: EntityKind) -> impl Future<Output = Result<u64>> + Send;

    /// Sum and average of Completed donation amounts.
    fn completed_gift_stats(&self) -> impl Future<Output = Result<GiftStats>> + Send;

    /// The `limit` most recent donations of any status, newest first.
    fn recent_donations(
        &self,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<DonationWithDonor>>> + Send;

    /// Completed donations, oldest first, optionally restricted to one donor.
    fn completed_donations(
        &self,
        donor_id: Option<i64>,
    ) -> impl Future<Output = Result<Vec<donation::Model>>> + Send;

    /// Every donor, in id order.
    fn donors(&self) -> impl Future<Output = Result<Vec<donor::Model>>> + Send;

    /// One donor by id.
    fn donor(&self, donor_id: i64) -> impl Future<Output = Result<Option<donor::Model>>> + Send;

    /// Every campaign with its linked donations, in campaign id order.
    fn campaigns_with_donations(
        &self,
    ) -> impl Future<Output = Result<Vec<CampaignWithDonations>>> + Send;
}

/// [`DashboardGateway`] over a `SeaORM` connection.
#[derive(Debug, Clone, Copy)]
pub struct SeaOrmGateway<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SeaOrmGateway<'a> {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

impl DashboardGateway for SeaOrmGateway<'_> {
    async fn count(&self, kind: EntityKind) -> Result<u64> {
        let count = match kind {
            EntityKind::Donors => Donor::find().count(self.db).await?,
            EntityKind::Donations => Donation::find().count(self.db).await?,
            EntityKind::Campaigns => Campaign::find().count(self.db).await?,
            EntityKind::Events => Event::find().count(self.db).await?,
        };
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn completed_gift_stats(&self) -> Result<GiftStats> {
        let row: Option<(Option<f64>, Option<f64>)> = Donation::find()
            .select_only()
            .column_as(
                Expr::expr(Func::sum(Expr::col(donation::Column::Amount))),
                "total",
            )
            .column_as(
                Expr::expr(Func::avg(Expr::col(donation::Column::Amount))),
                "average",
            )
            .filter(donation::Column::Status.eq(DonationStatus::Completed))
            .into_tuple()
            .one(self.db)
            .await?;

        let (total, average) = row.unwrap_or_default();
        Ok(GiftStats {
            total: total.unwrap_or(0.0),
            average: average.unwrap_or(0.0),
        })
    }

    #[instrument(skip(self))]
    async fn recent_donations(&self, limit: u64) -> Result<Vec<DonationWithDonor>> {
        let rows = Donation::find()
            .find_also_related(Donor)
            .order_by_desc(donation::Column::DonationDate)
            .order_by_desc(donation::Column::Id)
            .limit(limit)
            .all(self.db)
            .await?;

        let campaign_ids: BTreeSet<i64> = rows.iter().filter_map(|(d, _)| d.campaign_id).collect();
        let campaigns: HashMap<i64, campaign::Model> = if campaign_ids.is_empty() {
            HashMap::new()
        } else {
            Campaign::find()
                .filter(campaign::Column::Id.is_in(campaign_ids))
                .all(self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        rows.into_iter()
            .map(|(donation, donor)| {
                let donor = donor.ok_or(Error::InvalidRecord {
                    id: donation.id,
                    field: "donor_id",
                })?;
                let campaign = donation
                    .campaign_id
                    .and_then(|id| campaigns.get(&id).cloned());
                Ok(DonationWithDonor {
                    donation,
                    donor,
                    campaign,
                })
            })
            .collect()
    }

    async fn completed_donations(&self, donor_id: Option<i64>) -> Result<Vec<donation::Model>> {
        let mut query =
            Donation::find().filter(donation::Column::Status.eq(DonationStatus::Completed));
        if let Some(donor_id) = donor_id {
            query = query.filter(donation::Column::DonorId.eq(donor_id));
        }

        query
            .order_by_asc(donation::Column::DonationDate)
            .order_by_asc(donation::Column::Id)
            .all(self.db)
            .await
            .map_err(Into::into)
    }

    async fn donors(&self) -> Result<Vec<donor::Model>> {
        Donor::find()
            .order_by_asc(donor::Column::Id)
            .all(self.db)
            .await
            .map_err(Into::into)
    }

    async fn donor(&self, donor_id: i64) -> Result<Option<donor::Model>> {
        Donor::find_by_id(donor_id)
            .one(self.db)
            .await
            .map_err(Into::into)
    }

    async fn campaigns_with_donations(&self) -> Result<Vec<CampaignWithDonations>> {
        Ok(Campaign::find()
            .order_by_asc(campaign::Column::Id)
            .find_with_related(Donation)
            .all(self.db)
            .await?
            .into_iter()
            .map(|(campaign, donations)| CampaignWithDonations {
                campaign,
                donations,
            })
            .collect())
    }
}
