//! Product import from the parts catalogue's "MASTER - ENABLED" CSV export.
//!
//! The export opens with a metadata row and a header row. Columns are read by
//! position; anything past the end of a short row counts as blank.

use common::errors::AppError;
use csv::StringRecord;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use tracing::{info, warn};
use uuid::Uuid;

const MIN_FIELDS: usize = 10;

const SKU: usize = 5;
const NAME: usize = 6;
const ADDITIONAL_NOTES: usize = 7;
const APPLICATION_NOTES: usize = 8;
const PART_NUMBER: usize = 9;
const PRODUCT_CATEGORY: usize = 10;
const TYPE: usize = 11;
const YEAR: usize = 14;
const PRIMARY_OEM: usize = 15;
const ADDITIONAL_OEM: usize = 16;
const MANUFACTURER: usize = 18;
const MAKE: usize = 19;
const ENGINES: std::ops::Range<usize> = 21..28;
const CONDITION: usize = 27;
const IS_REMAN: usize = 28;
const PRICE: usize = 37;
const VENDOR_COST: usize = 39;
const ACTUAL_COST: usize = 40;
const HAS_CORE: usize = 46;
const CORE_PRICE: usize = 47;

const DEFAULT_CATEGORY: &str = "Remanufactured";
const REORDER_POINT: i32 = 5;

/// One catalogue row ready for the `products` table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub application: Option<String>,
    pub years: Option<String>,
    pub oe_number: Option<String>,
    pub comments: Option<String>,
    pub unit_price: Option<i64>,
    pub unit_cost: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum RowOutcome {
    Incomplete,
    MissingSku,
    Product(Box<NewProduct>),
}

#[derive(Debug, Default)]
pub struct ParsedCatalogue {
    pub products: Vec<NewProduct>,
    pub missing_sku: usize,
    pub duplicate_in_file: usize,
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped_existing: usize,
    pub with_price: usize,
    pub with_cost: usize,
    pub average_price_cents: i64,
    pub top_categories: Vec<(String, usize)>,
}

/// Trimmed text, or `None` for blanks and the `nan`/`none`/`null` placeholders.
pub fn clean_text(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() || matches!(text.to_lowercase().as_str(), "nan" | "none" | "null") {
        return None;
    }
    Some(text.to_string())
}

/// `"$1,800.00"` to `180000`. Anything that is not a number is `None`.
pub fn parse_price(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let dollars: f64 = cleaned.parse().ok()?;
    if !dollars.is_finite() {
        return None;
    }
    Some((dollars * 100.0).round() as i64)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn field(row: &StringRecord, index: usize) -> Option<String> {
    row.get(index).and_then(clean_text)
}

fn is_yes(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| v.eq_ignore_ascii_case("yes"))
}

/// Distinct engine names from the ENGINE columns, in column order.
pub fn engines(row: &StringRecord) -> Option<String> {
    let mut seen: Vec<String> = Vec::new();
    for index in ENGINES {
        if let Some(engine) = field(row, index) {
            if !seen.contains(&engine) {
                seen.push(engine);
            }
        }
    }
    (!seen.is_empty()).then(|| seen.join(", "))
}

fn joined(parts: Vec<String>, separator: &str) -> Option<String> {
    (!parts.is_empty()).then(|| parts.join(separator))
}

pub fn map_row(row: &StringRecord) -> RowOutcome {
    if row.len() < MIN_FIELDS {
        return RowOutcome::Incomplete;
    }
    let Some(sku) = field(row, SKU) else {
        return RowOutcome::MissingSku;
    };

    let name = field(row, NAME);
    let additional_notes = field(row, ADDITIONAL_NOTES);
    let application_notes = field(row, APPLICATION_NOTES);
    let part_number = field(row, PART_NUMBER);
    let category = field(row, PRODUCT_CATEGORY);
    let type_field = field(row, TYPE);
    let year = field(row, YEAR);
    let primary_oem = field(row, PRIMARY_OEM);
    let additional_oem = field(row, ADDITIONAL_OEM);
    let manufacturer = field(row, MANUFACTURER);
    let make = field(row, MAKE);
    let engines = engines(row);
    let condition = field(row, CONDITION);
    let is_reman = field(row, IS_REMAN);

    let price = row.get(PRICE).and_then(parse_price);
    let vendor_cost = row.get(VENDOR_COST).and_then(parse_price);
    let actual_cost = row.get(ACTUAL_COST).and_then(parse_price);
    let has_core = field(row, HAS_CORE);
    let core_price = row.get(CORE_PRICE).and_then(parse_price);

    let mut description = Vec::new();
    description.extend(additional_notes);
    description.extend(application_notes.map(|n| format!("Application: {n}")));
    description.extend(manufacturer.map(|m| format!("Manufacturer: {m}")));
    description.extend(condition.map(|c| format!("Condition: {c}")));
    if is_yes(&is_reman) {
        description.push("Remanufactured In-House".to_string());
    }
    if let Some(cents) = core_price.filter(|c| *c != 0 && is_yes(&has_core)) {
        description.push(format!("Core Exchange: ${:.2}", cents as f64 / 100.0));
    }

    let mut application = Vec::new();
    application.extend(make);
    application.extend(engines);
    application.extend(year.as_ref().map(|y| format!("({y})")));

    let mut comments = Vec::new();
    comments.extend(primary_oem.as_ref().map(|o| format!("OEM: {o}")));
    comments.extend(additional_oem.map(|o| format!("Alt OEM: {o}")));
    comments.extend(
        part_number
            .filter(|p| *p != sku)
            .map(|p| format!("Part#: {p}")),
    );

    let name = match (name, type_field) {
        (Some(name), _) => truncate(&name, 255),
        (None, Some(kind)) => truncate(&format!("{kind} {sku}"), 255),
        (None, None) => truncate(&sku, 255),
    };

    RowOutcome::Product(Box::new(NewProduct {
        name,
        description: joined(description, " | "),
        category: category
            .map(|c| truncate(&c, 128))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        application: joined(application, " ").map(|a| truncate(&a, 255)),
        years: year.map(|y| truncate(&y, 100)),
        oe_number: primary_oem.map(|o| truncate(&o, 255)),
        comments: joined(comments, " | "),
        unit_price: price,
        unit_cost: actual_cost.filter(|c| *c != 0).or(vendor_cost),
        sku,
    }))
}

/// Read a whole export. Rows after the first occurrence of a SKU are dropped.
pub fn parse_catalogue<R: Read>(source: R) -> Result<ParsedCatalogue, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);
    let mut records = reader.records();

    let malformed = |e: csv::Error| AppError::validation(format!("Malformed CSV: {}", e));

    records
        .next()
        .transpose()
        .map_err(malformed)?
        .ok_or_else(|| AppError::validation("CSV is empty"))?;
    let header = records
        .next()
        .transpose()
        .map_err(malformed)?
        .ok_or_else(|| AppError::validation("CSV has no header row"))?;
    info!(columns = header.len(), "Reading product catalogue");

    let mut parsed = ParsedCatalogue::default();
    let mut skus = HashSet::new();
    for record in records {
        match map_row(&record.map_err(malformed)?) {
            RowOutcome::Incomplete => {}
            RowOutcome::MissingSku => parsed.missing_sku += 1,
            RowOutcome::Product(product) => {
                if skus.insert(product.sku.clone()) {
                    parsed.products.push(*product);
                } else {
                    parsed.duplicate_in_file += 1;
                }
            }
        }
    }

    Ok(parsed)
}

/// Gross margin as a percentage of price.
pub fn margin_percent(price: i64, cost: i64) -> Option<f64> {
    (price != 0).then(|| (price - cost) as f64 / price as f64 * 100.0)
}

pub fn summarize(products: &[NewProduct], skipped_existing: usize) -> ImportSummary {
    let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
    for product in products {
        *categories.entry(product.category.as_str()).or_default() += 1;
    }
    let mut top_categories: Vec<(String, usize)> = categories
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    top_categories.sort_by(|a, b| b.1.cmp(&a.1));
    top_categories.truncate(5);

    let total_price: i64 = products.iter().filter_map(|p| p.unit_price).sum();

    ImportSummary {
        imported: products.len(),
        skipped_existing,
        with_price: products.iter().filter(|p| p.unit_price.is_some()).count(),
        with_cost: products.iter().filter(|p| p.unit_cost.is_some()).count(),
        average_price_cents: if products.is_empty() {
            0
        } else {
            total_price / products.len() as i64
        },
        top_categories,
    }
}

/// Insert the products whose SKU is not in the table yet, in one transaction.
pub async fn run(pool: &PgPool, products: Vec<NewProduct>) -> Result<ImportSummary, AppError> {
    let skus: Vec<String> = products.iter().map(|p| p.sku.clone()).collect();
    let existing: HashSet<String> =
        sqlx::query_scalar::<_, String>("SELECT sku FROM products WHERE sku = ANY($1::TEXT[])")
            .bind(&skus)
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    if !existing.is_empty() {
        let examples: Vec<&String> = existing.iter().take(3).collect();
        warn!(count = existing.len(), ?examples, "Skipping SKUs already in the database");
    }

    let fresh: Vec<NewProduct> = products
        .into_iter()
        .filter(|p| !existing.contains(&p.sku))
        .collect();
    if fresh.is_empty() {
        return Ok(summarize(&fresh, existing.len()));
    }

    let mut tx = pool.begin().await?;
    for product in &fresh {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description, category, application, years, oe_number,
                comments, unit_price, unit_cost, stock_quantity, reorder_point, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, $12, 'active')
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.application)
        .bind(&product.years)
        .bind(&product.oe_number)
        .bind(&product.comments)
        .bind(product.unit_price)
        .bind(product.unit_cost)
        .bind(REORDER_POINT)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(summarize(&fresh, existing.len()))
}
