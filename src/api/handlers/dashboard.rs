//! `GET /api/dashboard`

use crate::{
    api::{auth::CurrentUser, error::AppResult, state::AppState},
    core::{
        dashboard::{self, DashboardData},
        gateway::SeaOrmGateway,
    },
};
use axum::{Json, extract::State};
use chrono::Utc;
use tracing::info;

/// Returns the dashboard payload for any authenticated caller.
pub async fn get_dashboard(
    user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<DashboardData>> {
    info!(role = %user.role, "Dashboard requested");

    let gateway = SeaOrmGateway::new(&state.db);
    let data = dashboard::get_dashboard_data(&gateway, Utc::now(), &state.settings.dashboard).await?;
    Ok(Json(data))
}
