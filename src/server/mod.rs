//! HTTP API in front of the trip planning pipeline.

pub mod routes;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::Settings,
    error::{AgentError, Result},
    pipeline::TripPipeline,
};
pub use state::AppState;

/// Routes plus CORS for `origins` and request tracing.
pub fn router(state: Arc<AppState>, origins: &[String]) -> Router {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(target: "tripagent::server", %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/api/trip/plan", post(routes::plan_trip))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP API until Ctrl-C.
///
/// Settings are checked and the map toolset acquired once, before the
/// listener is bound.
pub async fn serve(settings: Settings) -> Result<()> {
    settings.log_summary();

    let (pipeline, toolset) = TripPipeline::launch(&settings).await?;
    let state = Arc::new(AppState::new(&settings, pipeline));
    let app = router(state, &settings.cors_origins_list());

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|err| AgentError::Config(format!("failed to bind {}: {}", addr, err)))?;

    info!(
        target: "tripagent::server",
        %addr,
        app = %settings.app_name,
        tools = toolset.len(),
        "trip planning service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AgentError::Http(format!("server error: {}", err)))?;

    info!(target: "tripagent::server", "shutting down");
    toolset.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "tripagent::server", error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
