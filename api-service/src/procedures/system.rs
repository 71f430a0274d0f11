use common::errors::AppError;
use common::models::HealthReport;
use serde_json::Value;

use super::to_data;
use crate::context::AppContext;

pub fn report(env: &common::env::Env, database_connected: bool) -> HealthReport {
    HealthReport {
        status: "ok".to_string(),
        production: env.is_production,
        ai_enabled: env.forge_enabled(),
        supabase_configured: env.supabase_configured(),
        database_configured: database_connected,
    }
}

pub async fn health(ctx: AppContext, _input: Option<Value>) -> Result<Value, AppError> {
    to_data(report(&ctx.env, ctx.pool.is_some()))
}
