//! Donation entity - A single gift from a donor.
//!
//! Each donation has a `donor_id`, amount, `donation_date`, status and an optional
//! attribution to either a campaign or an event (never both). Only donations whose
//! status is [`DonationStatus::Completed`] count toward money-raised figures.

use crate::errors;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a donation.
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
pub enum DonationStatus {
    /// Funds received; the only status counted in totals
    #[default]
    #[sea_orm(string_value = "Completed")]
    Completed,
    /// Awaiting settlement
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Withdrawn before settlement
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    /// Payment failed
    #[sea_orm(string_value = "Failed")]
    Failed,
    /// Returned to the donor
    #[sea_orm(string_value = "Refunded")]
    Refunded,
}

/// What a donation was given toward.
///
/// The store keeps two nullable columns; this type makes "at most one of them"
/// explicit. A row with both columns set is rejected by [`Model::attribution`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Attribution {
    /// General fund
    #[default]
    Unattributed,
    /// Given toward a campaign
    Campaign(i64),
    /// Given at an event
    Event(i64),
}

impl Attribution {
    /// Campaign id, if attributed to a campaign.
    #[must_use]
    pub const fn campaign_id(self) -> Option<i64> {
        match self {
            Self::Campaign(id) => Some(id),
            Self::Unattributed | Self::Event(_) => None,
        }
    }

    /// Event id, if attributed to an event.
    #[must_use]
    pub const fn event_id(self) -> Option<i64> {
        match self {
            Self::Event(id) => Some(id),
            Self::Unattributed | Self::Campaign(_) => None,
        }
    }
}

/// Donation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the donation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Donor who gave
    pub donor_id: i64,
    /// Amount given, in dollars
    pub amount: f64,
    /// When the gift was made
    pub donation_date: DateTimeUtc,
    /// Lifecycle state
    pub status: DonationStatus,
    /// Campaign the gift was made toward, if any
    pub campaign_id: Option<i64>,
    /// Event the gift was made at, if any
    pub event_id: Option<i64>,
    /// Whether the gift is part of a recurring pledge
    pub is_recurring: bool,
}

impl Model {
    /// Whether this donation counts toward money-raised figures.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == DonationStatus::Completed
    }

    /// Reads the campaign/event columns as a tagged [`Attribution`].
    pub fn attribution(&self) -> errors::Result<Attribution> {
        match (self.campaign_id, self.event_id) {
            (None, None) => Ok(Attribution::Unattributed),
            (Some(campaign_id), None) => Ok(Attribution::Campaign(campaign_id)),
            (None, Some(event_id)) => Ok(Attribution::Event(event_id)),
            (Some(_), Some(_)) => Err(errors::Error::InvalidRecord {
                id: self.id,
                field: "campaign_id/event_id",
            }),
        }
    }
}

/// Defines relationships between Donation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each donation belongs to one donor
    #[sea_orm(
        belongs_to = "super::donor::Entity",
        from = "Column::DonorId",
        to = "super::donor::Column::Id",
        on_delete = "Cascade"
    )]
    Donor,
    /// A donation may belong to a campaign
    #[sea_orm(
        belongs_to = "super::campaign::Entity",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id",
        on_delete = "SetNull"
    )]
    Campaign,
    /// A donation may belong to an event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "SetNull"
    )]
    Event,
}

impl Related<super::donor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
