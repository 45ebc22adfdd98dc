//! `RelayServer`: Axum HTTP + `WebSocket` server for display clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use relay_core::ConnectionId;
use relay_settings::ServerSettings;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::errors::ServerError;
use crate::health::HealthResponse;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::registry::ClientRegistry;
use crate::websocket::session::{SessionConfig, run_display_session};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registered display connections.
    pub registry: Arc<ClientRegistry>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Per-connection tunables.
    pub session_config: SessionConfig,
    /// When the server started.
    pub start_time: Instant,
}

/// The display-facing server.
pub struct RelayServer {
    settings: ServerSettings,
    registry: Arc<ClientRegistry>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl RelayServer {
    /// Create a new server with an empty registry.
    pub fn new(settings: ServerSettings) -> Self {
        Self {
            settings,
            registry: Arc::new(ClientRegistry::new()),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
            shutdown: self.shutdown.clone(),
            session_config: SessionConfig::from(&self.settings),
            start_time: self.start_time,
        };

        Router::new()
            .route("/", get(ws_handler))
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Bind the configured address and serve until shutdown.
    ///
    /// Returns the bound address (useful with port 0) and the serve task.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let addr = format!("{}:{}", self.settings.host, self.settings.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "display server listening");

        let router = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                error!(error = %e, "display server stopped with error");
            }
        });

        Ok((local_addr, handle))
    }

    /// Registered display connections. This is the pipeline's display sink.
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the listener settings.
    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }
}

/// GET / and GET /ws: upgrade to a display session.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    if state.shutdown.is_shutting_down() {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    let conn_id = ConnectionId::new();
    let session = state.shutdown.clone();
    ws.on_upgrade(move |socket| {
        session.track(run_display_session(
            socket,
            conn_id,
            state.registry,
            state.session_config,
            state.shutdown.token(),
        ))
    })
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_registry(
        &state.registry,
        state.start_time,
        state.shutdown.is_shutting_down(),
    ))
}
