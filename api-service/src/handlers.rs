use axum::{extract::State, response::Json};
use common::env::Env;
use common::models::HealthReport;
use std::sync::Arc;

use crate::procedures::system;

#[derive(Clone)]
pub struct HealthState {
    pub env: Arc<Env>,
    pub database_connected: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check", body = HealthReport)
    )
)]
pub async fn health(State(state): State<HealthState>) -> Json<HealthReport> {
    Json(system::report(&state.env, state.database_connected))
}
