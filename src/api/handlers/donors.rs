//! Donor endpoints: record management and insight.

use crate::{
    api::{
        auth::{CurrentUser, RequireWriter},
        error::AppResult,
        state::AppState,
    },
    core::{
        donor::{self, NewDonor},
        gateway::SeaOrmGateway,
        insight::{self, DonorInsight},
    },
    entities::donor::Model as DonorModel,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

/// `POST /api/donors`
pub async fn create_donor(
    RequireWriter(_user): RequireWriter,
    State(state): State<AppState>,
    Json(body): Json<NewDonor>,
) -> AppResult<(StatusCode, Json<DonorModel>)> {
    let created = donor::create_donor(&state.db, body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /api/donors/{id}`
///
/// Also removes the donor's donations and attendance records.
pub async fn delete_donor(
    RequireWriter(_user): RequireWriter,
    State(state): State<AppState>,
    Path(donor_id): Path<i64>,
) -> AppResult<StatusCode> {
    donor::delete_donor(&state.db, donor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_insight(state: &AppState, donor_id: i64) -> AppResult<DonorInsight> {
    let gateway = SeaOrmGateway::new(&state.db);
    let insight = insight::get_donor_insight(
        &gateway,
        donor_id,
        Utc::now(),
        state.settings.dashboard.trend_window_months,
    )
    .await?;
    Ok(insight)
}

/// `GET /api/donors/{id}/insight`
pub async fn get_insight(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(donor_id): Path<i64>,
) -> AppResult<Json<DonorInsight>> {
    Ok(Json(load_insight(&state, donor_id).await?))
}

/// `GET /api/donors/{id}/insight/summary`
///
/// Plain-text rendering of the insight.
pub async fn get_insight_summary(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(donor_id): Path<i64>,
) -> AppResult<String> {
    let insight = load_insight(&state, donor_id).await?;
    Ok(insight::render_summary(&insight))
}
