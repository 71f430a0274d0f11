use chrono::{DateTime, Utc};
use common::models::{Comment, Document, Post, Product};
use sqlx::PgPool;
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(sqlx::FromRow)]
pub struct ProductRow {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Substring pattern for `ILIKE` where the caller's backslash, `%` and `_` match literally.
pub fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

const PRODUCT_COLUMNS: &str = "id, sku, name, description, category, application, years, \
     oe_number, comments, unit_price, unit_cost, stock_quantity, reorder_point, status, \
     created_at, updated_at";

impl ProductRow {
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::TEXT IS NULL
                   OR sku ILIKE $1
                   OR name ILIKE $1
                   OR oe_number ILIKE $1)
              AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY sku
            LIMIT $3
            "#
        );

        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(search.map(contains_pattern))
            .bind(category)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_sku(pool: &PgPool, sku: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1");

        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(sku)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_stock(
        pool: &PgPool,
        sku: &str,
        stock_quantity: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE products SET stock_quantity = $1, updated_at = NOW()
            WHERE sku = $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(stock_quantity)
            .bind(sku)
            .fetch_optional(pool)
            .await
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            category: row.category,
            application: row.application,
            years: row.years,
            oe_number: row.oe_number,
            comments: row.comments,
            unit_price: row.unit_price,
            unit_cost: row.unit_cost,
            stock_quantity: row.stock_quantity,
            reorder_point: row.reorder_point,
            status: row.status,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct PostRow {
    pub id: String,
    #[sqlx(rename = "type")]
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub external_link: Option<String>,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewPost<'a> {
    pub post_type: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub tags: &'a [String],
    pub is_pinned: bool,
    pub external_link: Option<&'a str>,
    pub author_id: &'a str,
}

impl PostRow {
    pub async fn list(pool: &PgPool, post_type: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, type, title, content, tags, is_pinned, external_link, author_id,
                   created_at, updated_at
            FROM posts
            WHERE ($1::TEXT IS NULL OR type = $1)
            ORDER BY is_pinned DESC, created_at DESC
            "#,
        )
        .bind(post_type)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &PgPool, post: NewPost<'_>) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, type, title, content, tags, is_pinned, external_link, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, type, title, content, tags, is_pinned, external_link, author_id,
                      created_at, updated_at
            "#,
        )
        .bind(new_id())
        .bind(post.post_type)
        .bind(post.title)
        .bind(post.content)
        .bind(post.tags)
        .bind(post.is_pinned)
        .bind(post.external_link)
        .bind(post.author_id)
        .fetch_one(pool)
        .await
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            post_type: row.post_type,
            title: row.title,
            content: row.content,
            tags: row.tags,
            is_pinned: row.is_pinned,
            external_link: row.external_link,
            author_id: row.author_id,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

const INSERT_POST_COMMENT: &str = r#"
    INSERT INTO comments (id, commentable_id, commentable_type, content, author_id)
    SELECT $1, $2, 'post', $3, $4
    WHERE EXISTS (SELECT 1 FROM posts WHERE id = $2)
    RETURNING id, commentable_id, commentable_type, content, author_id, created_at
"#;

#[derive(sqlx::FromRow)]
pub struct CommentRow {
    pub id: String,
    pub commentable_id: String,
    pub commentable_type: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

impl CommentRow {
    pub async fn list_for_post(pool: &PgPool, post_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, commentable_id, commentable_type, content, author_id, created_at
            FROM comments
            WHERE commentable_type = 'post' AND commentable_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }

    /// Insert a comment on `post_id`. Returns `None` when the post does not
    /// exist; the check and the insert are one statement.
    pub async fn create_for_post(
        pool: &PgPool,
        post_id: &str,
        content: &str,
        author_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommentRow>(INSERT_POST_COMMENT)
            .bind(new_id())
            .bind(post_id)
            .bind(content)
            .bind(author_id)
            .fetch_optional(pool)
            .await
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            commentable_id: row.commentable_id,
            commentable_type: row.commentable_type,
            content: row.content,
            author_id: row.author_id,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: String,
    pub tags: Vec<String>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRow {
    pub async fn list(pool: &PgPool, category: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, title, category, description, file_url, file_type, tags, uploaded_by,
                   created_at, updated_at
            FROM documents
            WHERE ($1::TEXT IS NULL OR category = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(category)
        .fetch_all(pool)
        .await
    }
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            title: row.title,
            category: row.category,
            description: row.description,
            file_url: row.file_url,
            file_type: row.file_type,
            tags: row.tags,
            uploaded_by: row.uploaded_by,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

/// Mirror a Supabase user locally so authored rows can reference it.
pub async fn ensure_user(pool: &PgPool, id: &str, email: Option<&str>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email) VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET email = COALESCE(EXCLUDED.email, users.email)
        "#,
    )
    .bind(id)
    .bind(email)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("TX-1"), "%TX-1%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn comment_insert_requires_the_post() {
        let sql = INSERT_POST_COMMENT;
        assert!(sql.contains("SELECT $1, $2, 'post', $3, $4"));
        assert!(sql.contains("WHERE EXISTS (SELECT 1 FROM posts WHERE id = $2"));
        assert!(!sql.contains("VALUES"));
    }
}
