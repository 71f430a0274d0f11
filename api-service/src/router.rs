use common::errors::AppError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{Instrument, info_span};

use crate::context::AppContext;
use crate::procedures;
use crate::rpc::{ProcedureKind, RpcCall, RpcRouter};

type ProcedureFuture = Pin<Box<dyn Future<Output = Result<Value, AppError>> + Send>>;
type ProcedureFn = Box<dyn Fn(AppContext, Option<Value>) -> ProcedureFuture + Send + Sync>;

struct Procedure {
    kind: ProcedureKind,
    handler: ProcedureFn,
}

/// Name-to-handler registry for the hub's procedures.
#[derive(Default)]
pub struct AppRouter {
    procedures: BTreeMap<&'static str, Procedure>,
}

impl AppRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query<H, Fut>(self, name: &'static str, handler: H) -> Self
    where
        H: Fn(AppContext, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, AppError>> + Send + 'static,
    {
        self.register(name, ProcedureKind::Query, handler)
    }

    pub fn mutation<H, Fut>(self, name: &'static str, handler: H) -> Self
    where
        H: Fn(AppContext, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, AppError>> + Send + 'static,
    {
        self.register(name, ProcedureKind::Mutation, handler)
    }

    fn register<H, Fut>(mut self, name: &'static str, kind: ProcedureKind, handler: H) -> Self
    where
        H: Fn(AppContext, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, AppError>> + Send + 'static,
    {
        let handler: ProcedureFn =
            Box::new(move |ctx: AppContext, input: Option<Value>| -> ProcedureFuture {
                Box::pin(handler(ctx, input))
            });
        self.procedures.insert(name, Procedure { kind, handler });
        self
    }

    pub fn procedures(&self) -> impl Iterator<Item = (&'static str, ProcedureKind)> + '_ {
        self.procedures.iter().map(|(name, p)| (*name, p.kind))
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }
}

impl RpcRouter<AppContext> for AppRouter {
    async fn call(&self, ctx: &AppContext, call: RpcCall) -> Result<Value, AppError> {
        let procedure = self
            .procedures
            .get(call.path.as_str())
            .ok_or_else(|| AppError::not_found(format!("No procedure named '{}'", call.path)))?;

        if procedure.kind != call.kind {
            return Err(AppError::method_not_supported(format!(
                "'{}' is a {:?} procedure",
                call.path, procedure.kind
            )));
        }

        let span = info_span!("procedure", path = %call.path, request_id = %ctx.request_id);
        (procedure.handler)(ctx.clone(), call.input)
            .instrument(span)
            .await
    }
}

/// Every procedure the hub exposes.
pub fn app_router() -> AppRouter {
    AppRouter::new()
        .query("system.health", procedures::system::health)
        .query("auth.me", procedures::auth::me)
        .query("products.list", procedures::products::list)
        .query("products.bySku", procedures::products::by_sku)
        .mutation("products.updateStock", procedures::products::update_stock)
        .query("posts.list", procedures::posts::list)
        .mutation("posts.create", procedures::posts::create)
        .query("comments.list", procedures::posts::list_comments)
        .mutation("comments.create", procedures::posts::create_comment)
        .query("documents.list", procedures::documents::list)
}
