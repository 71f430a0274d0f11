use common::errors::AppError;
use common::models::Document;
use serde::Deserialize;
use serde_json::Value;

use super::{parse_input, to_data};
use crate::context::AppContext;
use crate::db::queries::DocumentRow;

#[derive(Deserialize)]
struct ListInput {
    category: Option<String>,
}

pub async fn list(ctx: AppContext, input: Option<Value>) -> Result<Value, AppError> {
    let input: ListInput = parse_input(input)?;
    let category = input.category.as_deref().filter(|c| !c.is_empty());

    let rows = DocumentRow::list(ctx.db()?, category).await?;

    to_data(rows.into_iter().map(Document::from).collect::<Vec<_>>())
}
