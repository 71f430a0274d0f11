use api_service::context::AppContextFactory;
use api_service::handlers::HealthState;
use api_service::router::app_router;
use api_service::rpc::RpcEndpoint;
use api_service::supabase::SupabaseAuth;
use api_service::create_router;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use common::env::Env;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn production_env() -> Arc<Env> {
    Arc::new(Env::resolve(|key| match key {
        "NODE_ENV" => Some("production".to_string()),
        "VITE_SUPABASE_URL" => Some("https://project.supabase.co".to_string()),
        _ => None,
    }))
}

fn app_with(env: Arc<Env>, auth: Option<SupabaseAuth>) -> Router {
    let health_state = HealthState {
        env: env.clone(),
        database_connected: false,
    };
    let factory = Arc::new(AppContextFactory::new(env, None, auth));
    create_router(
        health_state,
        RpcEndpoint::new(Arc::new(app_router()), factory, 1024),
    )
}

fn app() -> Router {
    app_with(production_env(), None)
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// /health reflects the resolved settings
#[tokio::test]
async fn health_route_reports_settings() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["production"], true);
    assert_eq!(body["supabaseConfigured"], false);
    assert_eq!(body["aiEnabled"], false);
}

#[tokio::test]
async fn rpc_health_over_the_wire() {
    let response = app()
        .oneshot(
            Request::get("/api/trpc/system.health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["result"]["data"]["status"], "ok");
}

#[tokio::test]
async fn head_request_reaches_a_query() {
    let response = app()
        .oneshot(
            Request::head("/api/trpc/system.health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn mutation_over_get_is_405() {
    let response = app()
        .oneshot(
            Request::get("/api/trpc/posts.create")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = json(response).await;
    assert_eq!(body["error"]["code"], "METHOD_NOT_SUPPORTED");
}

#[tokio::test]
async fn protected_mutation_without_session_is_401() {
    let response = app()
        .oneshot(
            Request::post("/api/trpc/products.updateStock")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"sku":"TX-1","stockQuantity":4}"#))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A bearer token is checked against Supabase before auth.me runs
#[tokio::test]
async fn signed_in_caller_reaches_auth_me() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer session-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-42",
            "email": "tech@example.com",
            "role": "authenticated"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = SupabaseAuth::new(&mock_server.uri(), "anon").expect("client");
    let response = app_with(production_env(), Some(auth))
        .oneshot(
            Request::get("/api/trpc/auth.me")
                .header("Authorization", "Bearer session-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["result"]["data"]["id"], "user-42");
    assert_eq!(body["result"]["data"]["email"], "tech@example.com");
}

/// Supabase being down fails the request before any procedure runs
#[tokio::test]
async fn unreachable_supabase_fails_the_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let auth = SupabaseAuth::new(&mock_server.uri(), "anon").expect("client");
    let response = app_with(production_env(), Some(auth))
        .oneshot(
            Request::get("/api/trpc/system.health")
                .header("Authorization", "Bearer session-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert!(response.status().is_server_error());
}
