use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalogue entry for a remanufactured part. Money is in cents.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub application: Option<String>,
    pub years: Option<String>,
    pub oe_number: Option<String>,
    pub comments: Option<String>,
    pub unit_price: Option<i64>,
    pub unit_cost: Option<i64>,
    pub stock_quantity: i32,
    pub reorder_point: i32,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// News feed entry
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(rename = "type")]
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub external_link: Option<String>,
    pub author_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub commentable_id: String,
    pub commentable_type: String,
    pub content: String,
    pub author_id: String,
    pub created_at: String,
}

/// Knowledge-base document
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: String,
    pub tags: Vec<String>,
    pub uploaded_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Caller identity as reported by Supabase Auth
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Post categories accepted by `posts.create`
pub const POST_TYPES: [&str; 4] = ["news", "bulletin", "diesel_tech", "announcement"];

/// Liveness report for `/health` and `system.health`
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub production: bool,
    pub ai_enabled: bool,
    pub supabase_configured: bool,
    pub database_configured: bool,
}
