//! Router assembly and server lifecycle.

use {
    crate::{delivery_routes, session_routes, state::GatewayState, subscriber_routes},
    anyhow::{Context, Result},
    axum::{
        Json, Router,
        extract::State,
        routing::{get, post},
    },
    snapsend_config::SnapsendConfig,
    std::{sync::Arc, time::Duration},
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

/// Interval between background sweeps of expired sessions and old tasks.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// How long a finished task stays queryable (matches the session TTL the
/// polling UI already works against).
const TASK_RETENTION: Duration = Duration::from_secs(15 * 60);

/// Cloneable handler state over the shared gateway runtime.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.gateway.version,
    }))
}

/// Build the full application router.
pub fn build_app(gateway: Arc<GatewayState>) -> Router {
    let state = AppState { gateway };

    let notifications = Router::new()
        .route("/send", post(delivery_routes::send_handler))
        .route("/tasks/{task_id}", get(delivery_routes::task_handler))
        .route("/chat/session", get(session_routes::session_status_handler))
        .route("/chat/link", post(session_routes::link_handler))
        .route("/subscribe", post(subscriber_routes::subscribe_handler))
        .route("/broadcast", post(subscriber_routes::broadcast_handler));

    // The booth UI is served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/notifications", notifications)
        .layer(cors)
        .with_state(state)
}

/// Run the gateway until the process is stopped.
pub async fn start_gateway(config: SnapsendConfig) -> Result<()> {
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let gateway = GatewayState::new(config);

    let sweeper = Arc::clone(&gateway);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            sweeper.sessions.write().await.evict_expired();
            sweeper.prune_finished_tasks(TASK_RETENTION).await;
        }
    });

    let app = build_app(gateway);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "gateway listening");
    axum::serve(listener, app)
        .await
        .context("gateway server exited")?;
    Ok(())
}
