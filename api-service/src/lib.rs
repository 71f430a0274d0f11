//! Diesel Hub API: the RPC endpoint, its context factory and the procedures
//! behind it.

pub mod config;
pub mod context;
pub mod db;
pub mod handlers;
pub mod openapi;
pub mod procedures;
pub mod router;
pub mod rpc;
pub mod supabase;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::rpc::{ContextFactory, RpcEndpoint, RpcRouter, rpc_routes};

/// `/health`, the RPC endpoint and Swagger UI behind one router.
pub fn create_router<R, F>(
    health_state: handlers::HealthState,
    endpoint: RpcEndpoint<R, F>,
) -> Router
where
    F: ContextFactory,
    R: RpcRouter<F::Context>,
{
    let health_routes = Router::new()
        .route("/health", get(handlers::health))
        .with_state(health_state);

    health_routes
        .merge(rpc_routes(endpoint))
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
