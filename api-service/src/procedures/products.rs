use common::errors::AppError;
use common::models::Product;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{parse_input, required, to_data};
use crate::context::AppContext;
use crate::db::queries::ProductRow;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Deserialize)]
struct ListInput {
    search: Option<String>,
    category: Option<String>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
struct SkuInput {
    sku: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockInput {
    sku: String,
    stock_quantity: i32,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn list(ctx: AppContext, input: Option<Value>) -> Result<Value, AppError> {
    let input: ListInput = parse_input(input)?;

    let limit = input.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::validation(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    let rows = ProductRow::list(
        ctx.db()?,
        non_blank(&input.search),
        non_blank(&input.category),
        limit,
    )
    .await?;

    to_data(rows.into_iter().map(Product::from).collect::<Vec<_>>())
}

pub async fn by_sku(ctx: AppContext, input: Option<Value>) -> Result<Value, AppError> {
    let input: SkuInput = parse_input(input)?;
    let sku = required("sku", &input.sku)?;

    let product = ProductRow::find_by_sku(ctx.db()?, sku)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No product with SKU {}", sku)))?;

    to_data(Product::from(product))
}

pub async fn update_stock(ctx: AppContext, input: Option<Value>) -> Result<Value, AppError> {
    let input: StockInput = parse_input(input)?;
    let sku = required("sku", &input.sku)?;
    if input.stock_quantity < 0 {
        return Err(AppError::validation("stockQuantity cannot be negative"));
    }
    let user = ctx.require_user()?;

    let product = ProductRow::update_stock(ctx.db()?, sku, input.stock_quantity)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No product with SKU {}", sku)))?;

    info!(
        sku = %sku,
        stock_quantity = input.stock_quantity,
        user_id = %user.id,
        "Stock updated"
    );

    to_data(Product::from(product))
}
