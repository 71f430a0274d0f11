use common::errors::AppError;
use common::models::{Comment, POST_TYPES, Post};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{parse_input, required, to_data};
use crate::context::AppContext;
use crate::db::queries::{self, CommentRow, NewPost, PostRow};

const MAX_TITLE_CHARS: usize = 255;

#[derive(Deserialize)]
struct ListInput {
    #[serde(rename = "type")]
    post_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInput {
    #[serde(rename = "type")]
    post_type: String,
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_pinned: bool,
    external_link: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsInput {
    post_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentInput {
    post_id: String,
    content: String,
}

pub async fn list(ctx: AppContext, input: Option<Value>) -> Result<Value, AppError> {
    let input: ListInput = parse_input(input)?;
    let post_type = input.post_type.as_deref().filter(|t| !t.is_empty());

    let rows = PostRow::list(ctx.db()?, post_type).await?;

    to_data(rows.into_iter().map(Post::from).collect::<Vec<_>>())
}

pub async fn create(ctx: AppContext, input: Option<Value>) -> Result<Value, AppError> {
    let input: CreateInput = parse_input(input)?;

    if !POST_TYPES.contains(&input.post_type.as_str()) {
        return Err(AppError::validation(format!(
            "type must be one of: {}",
            POST_TYPES.join(", ")
        )));
    }
    let title = required("title", &input.title)?;
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::validation("title is longer than 255 characters"));
    }
    let content = required("content", &input.content)?;
    let tags: Vec<String> = input
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let user = ctx.require_user()?;
    let pool = ctx.db()?;

    queries::ensure_user(pool, &user.id, user.email.as_deref()).await?;
    let post = PostRow::create(
        pool,
        NewPost {
            post_type: &input.post_type,
            title,
            content,
            tags: &tags,
            is_pinned: input.is_pinned,
            external_link: input.external_link.as_deref(),
            author_id: &user.id,
        },
    )
    .await?;

    info!(post_id = %post.id, user_id = %user.id, "Post created");

    to_data(Post::from(post))
}

pub async fn list_comments(ctx: AppContext, input: Option<Value>) -> Result<Value, AppError> {
    let input: CommentsInput = parse_input(input)?;
    let post_id = required("postId", &input.post_id)?;

    let rows = CommentRow::list_for_post(ctx.db()?, post_id).await?;

    to_data(rows.into_iter().map(Comment::from).collect::<Vec<_>>())
}

pub async fn create_comment(ctx: AppContext, input: Option<Value>) -> Result<Value, AppError> {
    let input: CreateCommentInput = parse_input(input)?;
    let post_id = required("postId", &input.post_id)?;
    let content = required("content", &input.content)?;

    let user = ctx.require_user()?;
    let pool = ctx.db()?;

    queries::ensure_user(pool, &user.id, user.email.as_deref()).await?;
    let comment = CommentRow::create_for_post(pool, post_id, content, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No post with id {}", post_id)))?;

    info!(comment_id = %comment.id, post_id = %post_id, "Comment added");

    to_data(Comment::from(comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::env::Env;
    use common::models::AuthUser;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    fn signed_in() -> AppContext {
        AppContext {
            env: Arc::new(Env::default()),
            pool: None,
            user: Some(AuthUser {
                id: "u1".to_string(),
                email: None,
                role: None,
            }),
            request_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn unknown_post_type_is_rejected() {
        let input = json!({ "type": "gossip", "title": "t", "content": "c" });
        let result = create(signed_in(), Some(input)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn overlong_title_is_rejected() {
        let input = json!({ "type": "news", "title": "x".repeat(256), "content": "c" });
        let result = create(signed_in(), Some(input)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn anonymous_create_is_unauthorized() {
        let mut ctx = signed_in();
        ctx.user = None;
        let input = json!({ "type": "news", "title": "t", "content": "c" });
        let result = create(ctx, Some(input)).await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let input = json!({ "postId": "p1", "content": "   " });
        let result = create_comment(signed_in(), Some(input)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
