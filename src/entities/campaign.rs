//! Campaign entity - A fundraising drive with an optional goal.
//!
//! `raised_amount` is a projection of the Completed donations attributed to the
//! campaign and is maintained by [`crate::core::projection`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Campaign lifecycle state.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CampaignStatus {
    /// Not yet accepting gifts
    #[sea_orm(string_value = "Planned")]
    Planned,
    /// Accepting gifts
    #[default]
    #[sea_orm(string_value = "Active")]
    Active,
    /// Temporarily paused
    #[sea_orm(string_value = "Paused")]
    Paused,
    /// Finished
    #[sea_orm(string_value = "Completed")]
    Completed,
    /// Abandoned
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// Campaign database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaigns")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the campaign
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Campaign name
    pub name: String,
    /// Fundraising target, if the campaign has one
    pub goal_amount: Option<f64>,
    /// Projection: sum of attributed Completed donations
    pub raised_amount: f64,
    /// Lifecycle state
    pub status: CampaignStatus,
}

/// Defines relationships between Campaign and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One campaign has many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
