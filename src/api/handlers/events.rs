//! Event endpoints.

use crate::{
    api::{auth::RequireWriter, error::AppResult, state::AppState},
    core::event::{self, NewEvent},
    entities::event::Model as EventModel,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Body of `PUT /api/events/{id}/attendance`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpdate {
    /// Who attended (or did not)
    pub donor_id: i64,
    /// Whether they showed up
    pub attended: bool,
}

/// `POST /api/events`
pub async fn create_event(
    RequireWriter(_user): RequireWriter,
    State(state): State<AppState>,
    Json(body): Json<NewEvent>,
) -> AppResult<(StatusCode, Json<EventModel>)> {
    let created = event::create_event(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/events/{id}/attendance`
///
/// Returns the event with its refreshed attendee count.
pub async fn record_attendance(
    RequireWriter(_user): RequireWriter,
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(body): Json<AttendanceUpdate>,
) -> AppResult<Json<EventModel>> {
    let updated =
        event::record_attendance(&state.db, event_id, body.donor_id, body.attended).await?;
    Ok(Json(updated))
}
