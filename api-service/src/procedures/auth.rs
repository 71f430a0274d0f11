use common::errors::AppError;
use serde_json::Value;

use super::to_data;
use crate::context::AppContext;

pub async fn me(ctx: AppContext, _input: Option<Value>) -> Result<Value, AppError> {
    to_data(ctx.require_user()?)
}
