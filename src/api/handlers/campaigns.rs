//! `POST /api/campaigns`

use crate::{
    api::{auth::RequireWriter, error::AppResult, state::AppState},
    core::campaign::{self, NewCampaign},
    entities::campaign::Model as CampaignModel,
};
use axum::{Json, extract::State, http::StatusCode};

/// Creates a campaign with nothing raised yet.
pub async fn create_campaign(
    RequireWriter(_user): RequireWriter,
    State(state): State<AppState>,
    Json(body): Json<NewCampaign>,
) -> AppResult<(StatusCode, Json<CampaignModel>)> {
    let created = campaign::create_campaign(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
