//! Donation write endpoints.

use crate::{
    api::{auth::RequireWriter, error::AppResult, state::AppState},
    core::donation::{self, NewDonation},
    entities::donation::{DonationStatus, Model as DonationModel},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Body of `PUT /api/donations/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    /// New status
    pub status: DonationStatus,
}

/// `POST /api/donations`
pub async fn create_donation(
    RequireWriter(_user): RequireWriter,
    State(state): State<AppState>,
    Json(body): Json<NewDonation>,
) -> AppResult<(StatusCode, Json<DonationModel>)> {
    let created = donation::create_donation(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/donations/{id}/status`
pub async fn update_status(
    RequireWriter(_user): RequireWriter,
    State(state): State<AppState>,
    Path(donation_id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> AppResult<Json<DonationModel>> {
    let updated = donation::update_donation_status(&state.db, donation_id, body.status).await?;
    Ok(Json(updated))
}

/// `DELETE /api/donations/{id}`
pub async fn delete_donation(
    RequireWriter(_user): RequireWriter,
    State(state): State<AppState>,
    Path(donation_id): Path<i64>,
) -> AppResult<StatusCode> {
    donation::delete_donation(&state.db, donation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
