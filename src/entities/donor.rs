//! Donor entity - A person or organisation that gives to the nonprofit.
//!
//! `total_donated` and `last_donation` are a cached projection of the donor's
//! Completed donations. They are rewritten by [`crate::core::projection`] on
//! every donation write and must never be edited directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Donor database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donors")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the donor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email address
    pub email: String,
    /// When the donor record was created
    pub created_at: DateTimeUtc,
    /// Projection: sum of the donor's Completed donation amounts
    pub total_donated: f64,
    /// Projection: date of the donor's most recent Completed donation
    pub last_donation: Option<DateTimeUtc>,
}

impl Model {
    /// Returns "First Last" for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Defines relationships between Donor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One donor has many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
    /// One donor has many event attendance records
    #[sea_orm(has_many = "super::event_attendance::Entity")]
    Attendance,
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl Related<super::event_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
