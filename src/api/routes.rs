//! Router assembly and server lifecycle.

use std::sync::Arc;

use axum::middleware;
use axum::{extract::State, response::Json, routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::accounts::AccountStore;
use crate::config::Config;
use crate::service::TaskService;
use crate::store;

use super::auth;
use super::stats;
use super::tasks;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Task CRUD + comments over the configured store
    pub service: TaskService,
    /// Account registration and credential verification
    pub accounts: Arc<AccountStore>,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let task_store = store::create_task_store(config.store, config.data_dir.clone())
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialize task store: {}", e))?;
    tracing::info!(
        store = %config.store,
        persistent = task_store.is_persistent(),
        "Task store initialized"
    );

    let service = TaskService::new(task_store);
    let accounts = Arc::new(AccountStore::new(&config.data_dir).await);

    let state = Arc::new(AppState {
        config: config.clone(),
        service,
        accounts,
    });

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/cadastre", post(auth::register));

    // Static segments (/tarefas/status, /tarefas/tags, ...) take precedence
    // over the /tarefas/:id capture.
    let protected_routes = Router::new()
        .nest("/tarefas", tasks::routes().merge(stats::routes()))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // The SPA is served from another origin.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT/SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.config.store.to_string(),
        dev_mode: state.config.dev_mode,
        auth_required: state.config.auth_required(),
    })
}
