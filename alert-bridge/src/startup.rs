//! Application startup and lifecycle management.
//!
//! Startup is strictly ordered: connect to the controller, pass the device
//! gate, and only then bind the HTTP listener.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use service_core::grpc::{ControllerClient, ControllerClientConfig};
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use service_core::observability::init_metrics;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::config::BridgeConfig;
use crate::gate::{check_device_active, GateError};
use crate::handlers::{health_check, metrics_endpoint, receive_alert};
use crate::services::ControllerApi;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub controller: Arc<dyn ControllerApi>,
    pub metrics: PrometheusHandle,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to connect to controller at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("Failed to bind HTTP listener to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Largest request body accepted on any route. Larger bodies get 413.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/alert", post(receive_alert))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route_layer(from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost, so the trace span sees the assigned id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect to the controller named in `config` and build the application.
    pub async fn build(config: BridgeConfig) -> Result<Self, StartupError> {
        let client = ControllerClient::new(ControllerClientConfig::for_address(
            &config.grpc_address,
        ))
        .await
        .map_err(|source| StartupError::Connect {
            address: config.grpc_address.clone(),
            source,
        })?;

        tracing::info!(grpc_address = %config.grpc_address, "Connected to controller");

        Self::build_with_controller(config, Arc::new(client)).await
    }

    /// Build the application around an existing controller handle.
    ///
    /// Fails without binding anything unless the device reports active.
    pub async fn build_with_controller(
        config: BridgeConfig,
        controller: Arc<dyn ControllerApi>,
    ) -> Result<Self, StartupError> {
        check_device_active(controller.as_ref(), &config.device_jid).await?;

        let listener = TcpListener::bind(&config.http_address)
            .await
            .map_err(|source| {
                tracing::error!(
                    "Failed to bind HTTP listener to {}: {}",
                    config.http_address,
                    source
                );
                StartupError::Bind {
                    address: config.http_address.clone(),
                    source,
                }
            })?;
        let http_port = listener.local_addr()?.port();

        tracing::info!(
            http_address = %config.http_address,
            http_port,
            device_jid = %config.device_jid,
            target_jid = %config.target_jid,
            "Alert bridge listening"
        );

        let state = AppState {
            config: Arc::new(config),
            controller,
            metrics: init_metrics(),
        };

        Ok(Self {
            http_port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Serve until SIGINT or SIGTERM, then drain in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
