//! Brake Alert Service
//!
//! Hosts one pipeline session behind an HTTP adapter: camera frames and GPS
//! speed samples come in, the current warning and metrics go out.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use alerting::{AlertCommand, DisplayUpdate};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use camera_capture::{frame_slot, FrameError, FrameSender};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use pipeline::{select_strategy, DegradedMode, FrameOutcome, FrameWorker, PipelineSession};
use serde::Serialize;
use speed_sensor::{SpeedHandle, SpeedSensor};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

mod config;
mod routes;

pub use config::{AppConfig, LoggingConfig, ServerConfig, CONFIG_PATH_ENV};

/// Pending alert commands before the output starts dropping them
const ALERT_CHANNEL_CAPACITY: usize = 16;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid frame: {0}")]
    BadFrame(#[from] FrameError),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadFrame(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Latest-frame slot feeding the worker
    pub frames: FrameSender,
    /// Speed sensor input and filtered output
    pub speed: SpeedHandle,
    /// Latest display update
    pub display: watch::Receiver<DisplayUpdate>,
    /// Set when running on the heuristic detector
    pub degraded: Option<DegradedMode>,
    /// Active detection strategy
    pub strategy: &'static str,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
    /// Last assigned frame sequence number
    pub sequence: AtomicU64,
    /// Body limit on the frame route
    pub max_frame_bytes: usize,
    pub version: String,
    pub start_time: Instant,
}

/// Running pipeline and its background tasks
pub struct Services {
    pub state: Arc<AppState>,
    worker: FrameWorker,
    speed_task: JoinHandle<()>,
    alert_task: JoinHandle<()>,
    results_task: JoinHandle<()>,
}

impl Services {
    /// Select a detection strategy and start the speed sensor, frame worker
    /// and collaborator tasks. Must be called inside a tokio runtime.
    pub fn start(config: &AppConfig, metrics: Option<PrometheusHandle>) -> anyhow::Result<Self> {
        let pipeline_config = &config.pipeline;

        let (strategy, degraded) = select_strategy(pipeline_config)?;
        let strategy_name = strategy.name();

        let (speed, speed_task) = SpeedSensor::spawn(pipeline_config.speed.clone());
        let (display_tx, display_rx) = watch::channel(DisplayUpdate::default());
        let (alert_tx, alert_rx) = mpsc::channel(ALERT_CHANNEL_CAPACITY);

        let session = PipelineSession::new(
            strategy,
            pipeline_config,
            speed.subscribe(),
            Box::new(alert_tx),
            Box::new(display_tx),
        )?;

        let (frames_tx, frames_rx) = frame_slot();
        let (results_tx, results_rx) = mpsc::channel(pipeline_config.result_capacity.max(1));
        let worker = FrameWorker::spawn(session, frames_rx, results_tx);

        let state = Arc::new(AppState {
            frames: frames_tx,
            speed,
            display: display_rx,
            degraded,
            strategy: strategy_name,
            metrics,
            sequence: AtomicU64::new(0),
            max_frame_bytes: config.server.max_frame_bytes,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        });

        Ok(Self {
            state,
            worker,
            speed_task,
            alert_task: tokio::spawn(alert_output(alert_rx)),
            results_task: tokio::spawn(log_results(results_rx)),
        })
    }

    /// Drain the worker, release the alert output and stop background tasks.
    ///
    /// Every other clone of the state (e.g. inside a router) must already be
    /// dropped, otherwise the frame slot stays open.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        drop(self.state);

        let session = self.worker.join().await?;
        session.shutdown();

        let _ = self.results_task.await;
        let _ = self.alert_task.await;
        let _ = self.speed_task.await;
        info!("Services stopped");
        Ok(())
    }
}

/// Audio/haptic output stand-in: logs each command
async fn alert_output(mut rx: mpsc::Receiver<AlertCommand>) {
    while let Some(command) = rx.recv().await {
        info!("Alert output: {}", command.as_str());
    }
}

async fn log_results(mut rx: mpsc::Receiver<FrameOutcome>) {
    while let Some(outcome) = rx.recv().await {
        debug!(
            "Frame {} {} level={} in {}ms",
            outcome.sequence,
            outcome.status.as_str(),
            outcome.decision.level.as_str(),
            outcome.latency.as_millis()
        );
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub strategy: String,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    pub speed_kmh: f64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let frame_limit = DefaultBodyLimit::max(state.max_frame_bytes);
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route(
            "/api/v1/frames",
            post(routes::frames::post_frame).layer(frame_limit),
        )
        .route(
            "/api/v1/speed",
            get(routes::speed::get_speed).post(routes::speed::post_speed),
        )
        .route("/api/v1/warning", get(routes::warning::get_warning))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = if state.degraded.is_some() {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        strategy: state.strategy.to_string(),
        degraded: state.degraded.is_some(),
        degraded_reason: state.degraded.as_ref().map(|d| d.reason.clone()),
        speed_kmh: state.speed.speed_kmh(),
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.max_level())
        .with_target(config.with_target)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics exporter unavailable: {}", e);
            None
        }
    }
}

/// Run the service until Ctrl-C
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let metrics = if config.server.metrics_enabled {
        install_metrics()
    } else {
        None
    };

    let services = Services::start(&config, metrics)?;
    if let Some(degraded) = &services.state.degraded {
        warn!("Running in degraded mode: {}", degraded.reason);
    }

    let app = create_router(Arc::clone(&services.state));
    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped, draining pipeline");
    services.shutdown().await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
