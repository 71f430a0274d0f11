use chrono::{Duration, Utc};
use common::errors::AppError;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::demo::{COMMENTS, DOCUMENTS, POSTS};

#[derive(Debug)]
pub struct SeedSummary {
    pub posts: usize,
    pub comments: usize,
    pub documents: usize,
    pub author: String,
}

#[derive(Debug)]
pub enum Outcome {
    Seeded(SeedSummary),
    Skipped { existing_posts: i64 },
}

/// How far back the item at `index` is dated. Spreads content over the past weeks.
pub fn age_of(index: usize, step_hours: i64) -> Duration {
    Duration::hours(step_hours * (index as i64 + 1))
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

pub async fn run(pool: &PgPool, reset: bool) -> Result<Outcome, AppError> {
    let author: Option<(String, Option<String>)> =
        sqlx::query_as("SELECT id, name FROM users ORDER BY created_at LIMIT 1")
            .fetch_optional(pool)
            .await?;
    let (author_id, author_name) = author
        .ok_or_else(|| AppError::validation("No users found, sign up first"))?;
    let author_name = author_name.unwrap_or_else(|| "Admin".to_string());

    let existing_posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await?;
    if existing_posts > 0 && !reset {
        return Ok(Outcome::Skipped { existing_posts });
    }

    info!(author = %author_name, "Seeding demo content");

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    if existing_posts > 0 {
        sqlx::query("DELETE FROM comments WHERE commentable_type = 'post'")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM posts").execute(&mut *tx).await?;
        info!(existing_posts, "Cleared existing posts");
    }

    let mut post_ids = Vec::with_capacity(POSTS.len());
    for (index, post) in POSTS.iter().enumerate() {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, type, title, content, tags, is_pinned,
                external_link, author_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&id)
        .bind(post.post_type)
        .bind(post.title)
        .bind(post.content)
        .bind(tags(post.tags))
        .bind(post.is_pinned)
        .bind(post.external_link)
        .bind(&author_id)
        .bind(now - age_of(index, 24 * 5))
        .bind(now)
        .execute(&mut *tx)
        .await?;
        post_ids.push(id);
    }

    for (index, comment) in COMMENTS.iter().enumerate() {
        let Some(post_id) = post_ids.get(comment.post) else {
            continue;
        };
        sqlx::query(
            r#"
            INSERT INTO comments (
                id, commentable_id, commentable_type, content, author_id, created_at
            ) VALUES ($1, $2, 'post', $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(post_id)
        .bind(comment.content)
        .bind(&author_id)
        .bind(now - age_of(index, 6))
        .execute(&mut *tx)
        .await?;
    }

    for (index, document) in DOCUMENTS.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO documents (
                id, title, category, description, file_url, file_type, tags,
                uploaded_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(document.title)
        .bind(document.category)
        .bind(document.description)
        .bind(document.file_url)
        .bind(document.file_type)
        .bind(tags(document.tags))
        .bind(&author_id)
        .bind(now - age_of(index, 24 * 10))
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Outcome::Seeded(SeedSummary {
        posts: POSTS.len(),
        comments: COMMENTS.len(),
        documents: DOCUMENTS.len(),
        author: author_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::POST_TYPES;

    #[test]
    fn demo_posts_use_known_types() {
        for post in &POSTS {
            assert!(POST_TYPES.contains(&post.post_type), "{}", post.post_type);
            assert!(post.title.chars().count() <= 255);
            assert!(!post.content.trim().is_empty());
        }
    }

    #[test]
    fn demo_comments_point_at_demo_posts() {
        assert!(COMMENTS.iter().all(|c| c.post < POSTS.len()));
    }

    #[test]
    fn some_posts_are_pinned() {
        assert_eq!(POSTS.iter().filter(|p| p.is_pinned).count(), 2);
    }

    #[test]
    fn ages_are_deterministic_and_increasing() {
        assert_eq!(age_of(0, 24), Duration::hours(24));
        assert_eq!(age_of(2, 24), Duration::hours(72));
        assert!(age_of(3, 6) > age_of(2, 6));
    }
}
