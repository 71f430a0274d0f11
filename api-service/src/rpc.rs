//! HTTP-to-RPC adapter.
//!
//! One catch-all route hands every request to an [`RpcRouter`] after building
//! a per-request context with a [`ContextFactory`]. The adapter applies no
//! policy of its own: errors from either collaborator travel through `?` to
//! axum's error path untouched.

use axum::{
    Router,
    body::to_bytes,
    extract::{Path, Query, Request, State},
    http::{Method, request::Parts},
    response::Json,
    routing::get,
};
use common::errors::AppError;
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

/// One parsed remote call
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    pub path: String,
    pub kind: ProcedureKind,
    pub input: Option<Value>,
}

/// Builds the value every procedure of a request sees.
pub trait ContextFactory: Send + Sync + 'static {
    type Context: Send + Sync + 'static;

    fn create_context(
        &self,
        parts: &Parts,
    ) -> impl Future<Output = Result<Self::Context, AppError>> + Send;
}

/// Resolves a call against its procedures: given a context, produce data or fail.
pub trait RpcRouter<C>: Send + Sync + 'static {
    fn call(&self, ctx: &C, call: RpcCall) -> impl Future<Output = Result<Value, AppError>> + Send;
}

pub struct RpcEndpoint<R, F> {
    router: Arc<R>,
    context_factory: Arc<F>,
    max_body_bytes: usize,
}

impl<R, F> Clone for RpcEndpoint<R, F> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            context_factory: self.context_factory.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl<R, F> RpcEndpoint<R, F>
where
    F: ContextFactory,
    R: RpcRouter<F::Context>,
{
    pub fn new(router: Arc<R>, context_factory: Arc<F>, max_body_bytes: usize) -> Self {
        Self {
            router,
            context_factory,
            max_body_bytes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RpcParams {
    pub batch: Option<String>,
    pub input: Option<String>,
}

impl RpcParams {
    fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1") | Some("true"))
    }
}

/// Mount the endpoint at `/api/trpc/{*path}`.
pub fn rpc_routes<R, F>(endpoint: RpcEndpoint<R, F>) -> Router
where
    F: ContextFactory,
    R: RpcRouter<F::Context>,
{
    Router::new()
        .route(
            "/api/trpc/{*path}",
            get(handle::<R, F>).post(handle::<R, F>),
        )
        .with_state(endpoint)
}

async fn handle<R, F>(
    State(endpoint): State<RpcEndpoint<R, F>>,
    Path(path): Path<String>,
    Query(params): Query<RpcParams>,
    request: Request,
) -> Result<Json<Value>, AppError>
where
    F: ContextFactory,
    R: RpcRouter<F::Context>,
{
    let (parts, body) = request.into_parts();

    let kind = match parts.method {
        Method::GET | Method::HEAD => ProcedureKind::Query,
        _ => ProcedureKind::Mutation,
    };

    let raw_input = match kind {
        ProcedureKind::Query => params.input.clone(),
        ProcedureKind::Mutation => {
            let bytes = to_bytes(body, endpoint.max_body_bytes)
                .await
                .map_err(|e| AppError::validation(format!("Unreadable request body: {}", e)))?;
            let text = String::from_utf8(bytes.to_vec())
                .map_err(|_| AppError::validation("Request body is not valid UTF-8"))?;
            Some(text)
        }
    };

    let calls = parse_calls(&path, kind, params.is_batch(), raw_input.as_deref())?;

    let ctx = endpoint.context_factory.create_context(&parts).await?;

    let mut results = Vec::with_capacity(calls.len());
    for call in calls {
        let data = endpoint.router.call(&ctx, call).await?;
        results.push(json!({ "result": { "data": data } }));
    }

    if params.is_batch() {
        Ok(Json(Value::Array(results)))
    } else {
        Ok(Json(results.pop().unwrap_or(Value::Null)))
    }
}

/// Split a request into calls. Batched requests carry comma-separated
/// procedure names and an input object keyed by call index.
pub fn parse_calls(
    path: &str,
    kind: ProcedureKind,
    batch: bool,
    raw_input: Option<&str>,
) -> Result<Vec<RpcCall>, AppError> {
    let input = match raw_input.map(str::trim) {
        None | Some("") => None,
        Some(text) => Some(serde_json::from_str::<Value>(text)?),
    };

    if !batch {
        if path.is_empty() {
            return Err(AppError::validation("Missing procedure path"));
        }
        return Ok(vec![RpcCall {
            path: path.to_string(),
            kind,
            input,
        }]);
    }

    let inputs = match input {
        None => serde_json::Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(AppError::validation(
                "Batch input must be an object keyed by call index",
            ));
        }
    };

    path.split(',')
        .enumerate()
        .map(|(index, name)| {
            if name.is_empty() {
                return Err(AppError::validation(format!(
                    "Empty procedure path at batch index {}",
                    index
                )));
            }
            Ok(RpcCall {
                path: name.to_string(),
                kind,
                input: inputs.get(&index.to_string()).cloned(),
            })
        })
        .collect()
}
