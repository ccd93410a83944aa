//! API server setup and configuration.

use std::future::IntoFuture;
use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use share_parser::extractor::ResolverFactory;
use share_parser::relay::StreamRelay;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::routes;
use crate::config::ServerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Share-link and id resolution
    pub factory: Arc<ResolverFactory>,
    /// Media stream relay
    pub relay: Arc<StreamRelay>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let factory = ResolverFactory::new(config.parser_config())?;
        let relay = StreamRelay::new(config.relay_config())?;
        Ok(Self::from_parts(factory, relay))
    }

    pub fn from_parts(factory: ResolverFactory, relay: StreamRelay) -> Self {
        Self {
            factory: Arc::new(factory),
            relay: Arc::new(relay),
        }
    }
}

/// API server.
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
    cancel_token: CancellationToken,
}

impl ApiServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Get the cancellation token for graceful shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Build the router with all middleware and routes.
    pub fn build_router(&self) -> Router {
        routes::create_router(self.state.clone()).layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                let mut make_span =
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO);
                use tower_http::trace::MakeSpan;
                make_span.make_span(req)
            }),
        )
    }

    /// Serve until the cancel token fires. In-flight requests get the
    /// configured grace period, after which open connections (typically
    /// long relays) are dropped.
    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.config.bind).await?;
        info!("API server listening on http://{}", listener.local_addr()?);

        let cancel_token = self.cancel_token.clone();
        let server = axum::serve(listener, self.build_router())
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("API server shutting down...");
            })
            .into_future();

        let grace = self.config.shutdown_grace;
        let cancel_token = self.cancel_token.clone();
        let grace_elapsed = async move {
            cancel_token.cancelled().await;
            tokio::time::sleep(grace).await;
        };

        tokio::select! {
            result = server => result?,
            _ = grace_elapsed => {
                warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed, dropping open connections");
            }
        }

        Ok(())
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

/// Resolves once Ctrl-C is received.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; shutdown only via cancel token");
        std::future::pending::<()>().await;
    }
}
