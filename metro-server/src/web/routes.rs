//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::domain::NetworkId;
use crate::loader::Store;
use crate::service::MetroError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/networks", get(list_networks::<S>))
        .route("/api/networks/:network/stations", get(suggest_stations::<S>))
        .route("/api/networks/:network/route", get(compute_route::<S>))
        .route("/api/cache", get(cache_stats::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn parse_network(raw: &str) -> Result<NetworkId, AppError> {
    NetworkId::parse(raw).map_err(|e| AppError::BadRequest {
        message: format!("{e}: {raw:?}"),
    })
}

/// List known networks.
async fn list_networks<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<NetworksResponse>, AppError> {
    let networks = state.service.list_networks().await?;

    Ok(Json(NetworksResponse {
        networks: networks.as_ref().clone(),
    }))
}

/// Autocomplete station names within a network.
async fn suggest_stations<S: Store>(
    State(state): State<AppState<S>>,
    Path(network): Path<String>,
    Query(req): Query<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let network_id = parse_network(&network)?;
    let limit = req
        .limit
        .unwrap_or(state.suggest_limit)
        .min(state.suggest_limit);

    let stations = state
        .service
        .suggest_stations(&network_id, &req.q, Some(limit))
        .await?;

    Ok(Json(SuggestResponse {
        network,
        prefix: req.q,
        stations,
    }))
}

/// Shortest route between two stations.
async fn compute_route<S: Store>(
    State(state): State<AppState<S>>,
    Path(network): Path<String>,
    Query(req): Query<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let network_id = parse_network(&network)?;
    if req.from.trim().is_empty() || req.to.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "both 'from' and 'to' are required".to_string(),
        });
    }

    let route = state
        .service
        .compute_route(&network_id, &req.from, &req.to)
        .await?;

    Ok(Json(RouteResponse::from_route(&network, route)))
}

/// Cache counters and resident networks.
async fn cache_stats<S: Store>(State(state): State<AppState<S>>) -> Json<CacheStatsResponse> {
    let stats = state.service.cache_stats();
    let resident_networks = state
        .service
        .cache()
        .resident_ids()
        .into_iter()
        .map(String::from)
        .collect();

    Json(CacheStatsResponse {
        stats,
        resident_networks,
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Metro(MetroError),
}

impl From<MetroError> for AppError {
    fn from(e: MetroError) -> Self {
        AppError::Metro(e)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Metro(e) => match e {
                MetroError::NotFound(_)
                | MetroError::StationNotFound(_)
                | MetroError::NoRoute { .. } => StatusCode::NOT_FOUND,
                MetroError::InvalidData(_) => StatusCode::INTERNAL_SERVER_ERROR,
                MetroError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "bad_request",
            AppError::Metro(e) => e.kind(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let kind = self.kind();
        let message = match &self {
            AppError::BadRequest { message } => message.clone(),
            AppError::Metro(e) => e.to_string(),
        };

        if status.is_server_error() {
            warn!(%status, kind, %message, "Request failed");
        } else {
            debug!(%status, kind, %message, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            kind: kind.to_string(),
        });
        (status, body).into_response()
    }
}
