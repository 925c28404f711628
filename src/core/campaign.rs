//! Campaign business logic - creation and lookup.

use crate::{
    entities::{Campaign, campaign},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Input for creating a campaign.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    /// Campaign name
    pub name: String,
    /// Fundraising target, if any
    #[serde(default)]
    pub goal_amount: Option<f64>,
    /// Initial state
    #[serde(default)]
    pub status: campaign::CampaignStatus,
}

/// Creates a campaign with nothing raised yet.
pub async fn create_campaign(
    db: &DatabaseConnection,
    new_campaign: NewCampaign,
) -> Result<campaign::Model> {
    if new_campaign.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Campaign name is required".to_string(),
        });
    }
    if let Some(goal) = new_campaign.goal_amount {
        if !goal.is_finite() || goal < 0.0 {
            return Err(Error::InvalidAmount { amount: goal });
        }
    }

    let campaign = campaign::ActiveModel {
        name: Set(new_campaign.name.trim().to_string()),
        goal_amount: Set(new_campaign.goal_amount),
        raised_amount: Set(0.0),
        status: Set(new_campaign.status),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(campaign_id = campaign.id, "Created campaign");
    Ok(campaign)
}

/// Retrieves a campaign by id.
pub async fn get_campaign_by_id(
    db: &DatabaseConnection,
    campaign_id: i64,
) -> Result<Option<campaign::Model>> {
    Campaign::find_by_id(campaign_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every campaign in id order.
pub async fn list_campaigns(db: &DatabaseConnection) -> Result<Vec<campaign::Model>> {
    Campaign::find()
        .order_by_asc(campaign::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_campaign_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_campaign(
            &db,
            NewCampaign {
                name: String::new(),
                goal_amount: None,
                status: campaign::CampaignStatus::Active,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_campaign(
            &db,
            NewCampaign {
                name: "Winter".to_string(),
                goal_amount: Some(-1.0),
                status: campaign::CampaignStatus::Active,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[tokio::test]
    async fn test_create_and_get_campaign() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_campaign(&db, "Library Wing", Some(25_000.0)).await?;
        assert_eq!(created.raised_amount, 0.0);

        let found = get_campaign_by_id(&db, created.id).await?.unwrap();
        assert_eq!(found.name, "Library Wing");
        assert_eq!(found.goal_amount, Some(25_000.0));
        assert_eq!(found.status, campaign::CampaignStatus::Active);

        assert_eq!(list_campaigns(&db).await?.len(), 1);
        Ok(())
    }
}
