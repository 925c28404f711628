//! `POST /api/projections/recalculate`

use crate::{
    api::{auth::RequireAdmin, error::AppResult, state::AppState},
    core::projection::{self, RecalculationReport},
};
use axum::{Json, extract::State};
use tracing::info;

/// Rebuilds every derived field. Admin only.
pub async fn recalculate(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<RecalculationReport>> {
    info!(role = %user.role, "Projection rebuild requested");
    let report = projection::recalculate_all(&state.db).await?;
    Ok(Json(report))
}
