//! Donor business logic - creation, lookup and removal.
//!
//! Donors start with empty projections; their totals are filled in by
//! [`crate::core::projection`] as donations arrive. Removing a donor removes
//! their donations and attendance records and refreshes every campaign and
//! event that lost a source row.

use crate::{
    core::projection,
    entities::{Donation, Donor, EventAttendance, donation, donor, event_attendance},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::info;

/// Input for creating a donor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonor {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email address
    pub email: String,
}

impl NewDonor {
    fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Donor first and last name are required".to_string(),
            });
        }
        if !self.email.contains('@') {
            return Err(Error::Validation {
                message: format!("Invalid email address: {}", self.email),
            });
        }
        Ok(())
    }
}

/// Creates a donor with empty projections.
pub async fn create_donor(
    db: &DatabaseConnection,
    new_donor: NewDonor,
    created_at: DateTime<Utc>,
) -> Result<donor::Model> {
    new_donor.validate()?;

    let donor = donor::ActiveModel {
        first_name: Set(new_donor.first_name.trim().to_string()),
        last_name: Set(new_donor.last_name.trim().to_string()),
        email: Set(new_donor.email.trim().to_string()),
        created_at: Set(created_at),
        total_donated: Set(0.0),
        last_donation: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(donor_id = donor.id, "Created donor");
    Ok(donor)
}

/// Retrieves a donor by id.
pub async fn get_donor_by_id(db: &DatabaseConnection, donor_id: i64) -> Result<Option<donor::Model>> {
    Donor::find_by_id(donor_id).one(db).await.map_err(Into::into)
}

/// Lists every donor in id order.
pub async fn list_donors(db: &DatabaseConnection) -> Result<Vec<donor::Model>> {
    Donor::find()
        .order_by_asc(donor::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a donor together with their donations and attendance records.
pub async fn delete_donor(db: &DatabaseConnection, donor_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let donor = Donor::find_by_id(donor_id)
        .one(&txn)
        .await?
        .ok_or(Error::DonorNotFound { id: donor_id })?;

    let donations = Donation::find()
        .filter(donation::Column::DonorId.eq(donor_id))
        .all(&txn)
        .await?;
    let campaign_ids: BTreeSet<i64> = donations.iter().filter_map(|d| d.campaign_id).collect();

    let attendance = EventAttendance::find()
        .filter(event_attendance::Column::DonorId.eq(donor_id))
        .all(&txn)
        .await?;
    let event_ids: BTreeSet<i64> = attendance.iter().map(|a| a.event_id).collect();

    Donation::delete_many()
        .filter(donation::Column::DonorId.eq(donor_id))
        .exec(&txn)
        .await?;
    EventAttendance::delete_many()
        .filter(event_attendance::Column::DonorId.eq(donor_id))
        .exec(&txn)
        .await?;
    donor.delete(&txn).await?;

    for campaign_id in campaign_ids {
        projection::refresh_campaign(&txn, campaign_id).await?;
    }
    for event_id in event_ids {
        projection::refresh_event(&txn, event_id).await?;
    }

    txn.commit().await?;

    info!(
        donor_id,
        donations_removed = donations.len(),
        "Deleted donor"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{Campaign, Event, donation::Attribution, donation::DonationStatus};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_donor_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_donor(
            &db,
            NewDonor {
                first_name: " ".to_string(),
                last_name: "Hopper".to_string(),
                email: "grace@example.org".to_string(),
            },
            utc(2024, 1, 1),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_donor(
            &db,
            NewDonor {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: "not-an-email".to_string(),
            },
            utc(2024, 1, 1),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_and_list_donors() -> Result<()> {
        let db = setup_test_db().await?;
        let ada = create_test_donor(&db, "Ada", "Lovelace").await?;
        let grace = create_test_donor(&db, "Grace", "Hopper").await?;

        assert_eq!(ada.total_donated, 0.0);
        assert!(ada.last_donation.is_none());

        let donors = list_donors(&db).await?;
        let ids: Vec<i64> = donors.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![ada.id, grace.id]);

        let found = get_donor_by_id(&db, grace.id).await?.unwrap();
        assert_eq!(found.full_name(), "Grace Hopper");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_donor_refreshes_campaign_and_event() -> Result<()> {
        let (db, donor) = setup_with_donor().await?;
        let other = create_test_donor(&db, "Grace", "Hopper").await?;
        let campaign = create_test_campaign(&db, "Roof Fund", Some(5000.0)).await?;
        let event = create_test_event(&db, "Open House").await?;

        create_custom_gift(
            &db,
            donor.id,
            200.0,
            utc(2024, 5, 1),
            DonationStatus::Completed,
            Attribution::Campaign(campaign.id),
        )
        .await?;
        create_custom_gift(
            &db,
            other.id,
            50.0,
            utc(2024, 5, 2),
            DonationStatus::Completed,
            Attribution::Campaign(campaign.id),
        )
        .await?;
        crate::core::event::record_attendance(&db, event.id, donor.id, true).await?;

        delete_donor(&db, donor.id).await?;

        assert!(get_donor_by_id(&db, donor.id).await?.is_none());
        let campaign = Campaign::find_by_id(campaign.id).one(&db).await?.unwrap();
        assert_eq!(campaign.raised_amount, 50.0);
        let event = Event::find_by_id(event.id).one(&db).await?.unwrap();
        assert_eq!(event.attendees, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_donor() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_donor(&db, 77).await;
        assert!(matches!(result, Err(Error::DonorNotFound { id: 77 })));
        Ok(())
    }
}
