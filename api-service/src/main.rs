use api_service::context::AppContextFactory;
use api_service::rpc::RpcEndpoint;
use api_service::supabase::SupabaseAuth;
use api_service::{config, create_router, handlers, router};
use common::env::Env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Resolved once; everything below shares this allocation.
    let env = Arc::new(Env::from_env());
    common::tracing::init_for(env.is_production);

    let missing = env.missing();
    if !missing.is_empty() {
        warn!(?missing, "Settings resolved to empty values");
    }

    let config = config::Config::from_env();

    let pool = if env.database_url.is_empty() {
        warn!("DATABASE_URL is empty, database procedures will fail");
        None
    } else {
        Some(common::db::create_pool(&env.database_url).await?)
    };

    let auth = SupabaseAuth::from_env(&env)?;
    if auth.is_none() {
        warn!("Supabase is not configured, every caller is anonymous");
    }

    let health_state = handlers::HealthState {
        env: env.clone(),
        database_connected: pool.is_some(),
    };

    let rpc_router = Arc::new(router::app_router());
    let procedure_names: Vec<&str> = rpc_router.procedures().map(|(name, _)| name).collect();
    info!(count = rpc_router.len(), procedures = ?procedure_names, "RPC router ready");

    let context_factory = Arc::new(AppContextFactory::new(env.clone(), pool, auth));
    let endpoint = RpcEndpoint::new(rpc_router, context_factory, config.max_body_bytes);

    let app = create_router(health_state, endpoint);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Diesel Hub API starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Diesel Hub API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }

    warn!("Shutting down gracefully...");
}
