//! Event entity - A fundraising or stewardship event.
//!
//! `attendees` counts attendance records with `attended = true`; it is a
//! projection maintained by [`crate::core::projection`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Event name
    pub name: String,
    /// When the event takes place
    pub event_date: DateTimeUtc,
    /// Projection: number of donors who attended
    pub attendees: i64,
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One event has many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
    /// One event has many attendance records
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
