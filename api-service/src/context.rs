use axum::http::{HeaderMap, request::Parts};
use common::env::Env;
use common::errors::AppError;
use common::models::AuthUser;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::rpc::ContextFactory;
use crate::supabase::SupabaseAuth;

/// What every procedure of one request sees.
#[derive(Clone)]
pub struct AppContext {
    pub env: Arc<Env>,
    pub pool: Option<PgPool>,
    pub user: Option<AuthUser>,
    pub request_id: Uuid,
}

impl AppContext {
    pub fn db(&self) -> Result<&PgPool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::internal("DATABASE_URL is not configured"))
    }

    pub fn require_user(&self) -> Result<&AuthUser, AppError> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::auth("Sign in to use this procedure"))
    }
}

pub struct AppContextFactory {
    env: Arc<Env>,
    pool: Option<PgPool>,
    auth: Option<SupabaseAuth>,
}

impl AppContextFactory {
    pub fn new(env: Arc<Env>, pool: Option<PgPool>, auth: Option<SupabaseAuth>) -> Self {
        Self { env, pool, auth }
    }
}

impl ContextFactory for AppContextFactory {
    type Context = AppContext;

    async fn create_context(&self, parts: &Parts) -> Result<AppContext, AppError> {
        let request_id = request_id(&parts.headers);

        let user = match (bearer_token(&parts.headers), &self.auth) {
            (Some(token), Some(auth)) => auth.get_user(token).await?,
            (Some(_), None) => {
                warn!(%request_id, "Bearer token ignored, Supabase is not configured");
                None
            }
            (None, _) => None,
        };

        Ok(AppContext {
            env: self.env.clone(),
            pool: self.pool.clone(),
            user,
            request_id,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn request_id(headers: &HeaderMap) -> Uuid {
    headers
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| Uuid::parse_str(h).ok())
        .unwrap_or_else(Uuid::new_v4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::get("/api/trpc/auth.me");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).expect("request").into_parts().0
    }

    #[tokio::test]
    async fn anonymous_request_without_supabase() {
        let env = Arc::new(Env::default());
        let factory = AppContextFactory::new(env.clone(), None, None);

        let ctx = factory
            .create_context(&parts(&[("Authorization", "Bearer abc")]))
            .await
            .expect("context");

        assert!(ctx.user.is_none());
        assert!(Arc::ptr_eq(&ctx.env, &env));
        assert!(matches!(ctx.db(), Err(AppError::InternalError(_))));
        assert!(matches!(ctx.require_user(), Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn bearer_token_resolves_user() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "u-7", "email": null })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let auth = SupabaseAuth::new(&mock_server.uri(), "anon").expect("client");
        let factory = AppContextFactory::new(Arc::new(Env::default()), None, Some(auth));

        let ctx = factory
            .create_context(&parts(&[("Authorization", "Bearer token-1")]))
            .await
            .expect("context");

        assert_eq!(ctx.require_user().expect("user").id, "u-7");
    }

    #[tokio::test]
    async fn no_header_means_no_lookup() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let auth = SupabaseAuth::new(&mock_server.uri(), "anon").expect("client");
        let factory = AppContextFactory::new(Arc::new(Env::default()), None, Some(auth));

        let ctx = factory.create_context(&parts(&[])).await.expect("context");
        assert!(ctx.user.is_none());
    }

    #[tokio::test]
    async fn request_id_header_is_reused() {
        let factory = AppContextFactory::new(Arc::new(Env::default()), None, None);
        let id = "6f1d3c1e-8d4b-4a55-9b0e-3f7f1c2a9e10";

        let ctx = factory
            .create_context(&parts(&[("x-request-id", id)]))
            .await
            .expect("context");
        assert_eq!(ctx.request_id.to_string(), id);

        let ctx = factory
            .create_context(&parts(&[("x-request-id", "not-a-uuid")]))
            .await
            .expect("context");
        assert_ne!(ctx.request_id.to_string(), "not-a-uuid");
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Basic abc".parse().expect("value"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", "Bearer  abc ".parse().expect("value"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
