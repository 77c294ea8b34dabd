//! Footprint HTTP server.
//!
//! Serves the outline of the building at an address as local metre
//! coordinates for the 3D frontend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use footprint::config::{validate_radius, Config};
use footprint::{Footprint, FootprintError, FootprintService};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Building footprint server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Search radius in metres (overrides config)
    #[arg(long)]
    radius: Option<f64>,

    /// Maximum log level
    #[arg(long, default_value = "debug")]
    log_level: Level,
}

/// Application state shared across handlers
struct AppState {
    service: FootprintService,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_default(args.config.as_ref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(radius) = args.radius {
        config.search.radius_m = validate_radius(radius).context("Invalid --radius")?;
    }

    info!("Footprint Server");
    info!(
        "Nominatim at {}, Overpass at {}, search radius {} m",
        config.upstream.nominatim_url, config.upstream.overpass_url, config.search.radius_m
    );

    let state = Arc::new(AppState {
        service: FootprintService::from_config(&config)?,
    });

    let app = router(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/footprint", get(footprint_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
struct FootprintQueryParams {
    /// Free-form street address
    address: Option<String>,
}

/// Outline of the building nearest to the geocoded address
async fn footprint_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FootprintQueryParams>,
) -> Result<Json<Footprint>, ApiError> {
    let address = params
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Address is required"))?;

    let footprint = state.service.footprint(address).await?;
    Ok(Json(footprint))
}

/// Error response rendered as `{"error": "..."}`
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

fn status_for(err: &FootprintError) -> StatusCode {
    match err {
        FootprintError::AddressNotFound(_)
        | FootprintError::EmptyInput
        | FootprintError::NoPolygonGeometry => StatusCode::NOT_FOUND,
        FootprintError::UpstreamFetchFailure { .. } => StatusCode::BAD_GATEWAY,
        FootprintError::DegeneratePolygon(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<FootprintError> for ApiError {
    fn from(err: FootprintError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            error!("Footprint lookup failed: {}", err);
        } else {
            warn!("Footprint lookup failed: {}", err);
        }
        ApiError::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
