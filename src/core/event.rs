//! Event business logic - creation, lookup and attendance.
//!
//! Recording attendance refreshes the event's `attendees` projection in the
//! same transaction as the attendance write.

use crate::{
    core::projection,
    entities::{Donor, Event, EventAttendance, event, event_attendance},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Input for creating an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    /// Event name
    pub name: String,
    /// When the event takes place
    pub event_date: DateTime<Utc>,
}

/// Creates an event with no attendees.
pub async fn create_event(db: &DatabaseConnection, new_event: NewEvent) -> Result<event::Model> {
    if new_event.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Event name is required".to_string(),
        });
    }

    let event = event::ActiveModel {
        name: Set(new_event.name.trim().to_string()),
        event_date: Set(new_event.event_date),
        attendees: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(event_id = event.id, "Created event");
    Ok(event)
}

/// Retrieves an event by id.
pub async fn get_event_by_id(db: &DatabaseConnection, event_id: i64) -> Result<Option<event::Model>> {
    Event::find_by_id(event_id).one(db).await.map_err(Into::into)
}

/// Records whether a donor attended an event, replacing any earlier record for
/// the same pair, and returns the event with its refreshed attendee count.
pub async fn record_attendance(
    db: &DatabaseConnection,
    event_id: i64,
    donor_id: i64,
    attended: bool,
) -> Result<event::Model> {
    let txn = db.begin().await?;

    Event::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or(Error::EventNotFound { id: event_id })?;
    Donor::find_by_id(donor_id)
        .one(&txn)
        .await?
        .ok_or(Error::DonorNotFound { id: donor_id })?;

    let existing = EventAttendance::find()
        .filter(event_attendance::Column::EventId.eq(event_id))
        .filter(event_attendance::Column::DonorId.eq(donor_id))
        .one(&txn)
        .await?;

    if let Some(record) = existing {
        let mut active_model: event_attendance::ActiveModel = record.into();
        active_model.attended = Set(attended);
        active_model.update(&txn).await?;
    } else {
        event_attendance::ActiveModel {
            event_id: Set(event_id),
            donor_id: Set(donor_id),
            attended: Set(attended),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    let event = projection::refresh_event(&txn, event_id).await?;
    txn.commit().await?;

    Ok(event)
}
