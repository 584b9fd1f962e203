//! HTTP server bootstrap — plain axum over TCP, no TLS and no message bus
//! (clients poll REST endpoints). Wraps the router in the tower-http
//! trace/request-id/CORS/compression stack and a `tower::timeout` bound
//! from [`Config::request_timeout_ms`].

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::{Config, Result, ServerState};

/// Owns the bound config/state; `run` drives the listener until either the
/// socket closes or the shutdown token fires.
pub struct Server {
    config: Config,
    state: ServerState,
    shutdown: CancellationToken,
}

impl Server {
    /// Builds the server around an already-initialized [`ServerState`] —
    /// the binary entrypoint owns the fallible `ServerState::initialize`
    /// call so startup errors are reported distinctly from transport errors.
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Clone of the token that, when cancelled, triggers graceful shutdown
    /// of [`Self::run`].
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(self) -> Result<()> {
        let app = crate::api::router(self.state.clone()).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_millis(
                    self.config.request_timeout_ms,
                ))),
        );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("edge server listening on {}", addr);

        let shutdown = self.shutdown.clone();
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("shutdown signal received, draining in-flight requests");
            })
            .await?;

        Ok(())
    }
}
