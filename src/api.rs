//! HTTP surface: JSON API and server-rendered pages
//!
//! `build_router` returns the bare router; `main` adds the trace layer.

mod handlers;
mod pages;
mod query;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::database::Database;
use crate::errors::FreightDeskError;
use crate::fetchers::Fetchers;

/// Shared handler state
pub struct AppState {
    pub db: Database,
    pub fetchers: Fetchers,
}

impl AppState {
    pub fn new(db: Database, fetchers: Fetchers) -> Self {
        Self { db, fetchers }
    }
}

/// Error rendered as `{ "error": message }`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Log `e` and map it to a status; server-side failures get the generic
    /// `context` message
    pub fn from_error(context: &str, e: FreightDeskError) -> Self {
        match e {
            FreightDeskError::NotFound(message) => Self::not_found(message),
            FreightDeskError::InvalidInput(_)
            | FreightDeskError::ValidationError(_)
            | FreightDeskError::InvalidImo(_)
            | FreightDeskError::AlreadyExists(_) => Self::bad_request(e.to_string()),
            FreightDeskError::NotImplemented(_) => Self {
                status: StatusCode::NOT_IMPLEMENTED,
                message: e.to_string(),
            },
            e => {
                error!("{}: {}", context, e);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: context.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// `map_err` adapter attaching a generic failure message
pub(crate) fn failed(context: &'static str) -> impl FnOnce(FreightDeskError) -> ApiError {
    move |e| ApiError::from_error(context, e)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/freight-grid", get(pages::freight_grid))
        .route("/routes", get(pages::routes))
        .route("/routes/:route_code", get(pages::route_detail))
        .route("/rates", get(pages::rates))
        .route("/vessels", get(pages::vessels))
        .route("/vessels/:imo", get(pages::vessel_detail))
        .route("/ffa", get(pages::ffa))
        .route("/api/vessels", get(handlers::list_vessels))
        .route("/api/vessels/:imo", get(handlers::get_vessel))
        .route("/api/fetch/vessels", post(handlers::fetch_vessels))
        .route("/api/ffa", get(handlers::list_ffa))
        .route("/api/ffa/latest", get(handlers::latest_ffa))
        .route("/api/ffa/month/:contract_month", get(handlers::ffa_by_month))
        .route("/api/ffa/route/:route_code", get(handlers::ffa_route_history))
        .route("/api/fetch/ffa", post(handlers::fetch_ffa))
        .route(
            "/api/freight/routes",
            get(handlers::list_routes).post(handlers::create_route),
        )
        .route(
            "/api/freight/routes/:id",
            get(handlers::get_route).put(handlers::update_route),
        )
        .route(
            "/api/freight/routes/code/:route_code",
            get(handlers::get_route_by_code),
        )
        .route("/api/freight/grid", get(handlers::freight_grid))
        .route("/api/freight/rates", post(handlers::create_rate))
        .route(
            "/api/freight/rates/:id",
            get(handlers::route_rates).put(handlers::update_rate),
        )
        .route("/api/freight/rates/date/:date", get(handlers::rates_by_date))
        .route("/api/freight/init/routes", post(handlers::init_routes))
        .route("/api/freight/fetch/rates", post(handlers::fetch_rates))
        .route("/api/position-lists", post(handlers::save_position_list))
        .route(
            "/api/position-lists/custom",
            post(handlers::create_custom_list),
        )
        .route(
            "/api/position-lists/ships-from-port",
            get(handlers::ships_from_port),
        )
        .route("/api/position-lists/:id", get(handlers::get_position_list))
        .route(
            "/api/position-lists/:id/status",
            post(handlers::update_vessel_status),
        )
        .route(
            "/api/position-lists/:id/deduplicate",
            post(handlers::deduplicate_position_list),
        )
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds() {
        let e = ApiError::from_error(
            "Failed to fetch vessel",
            FreightDeskError::NotFound("Vessel not found".into()),
        );
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.message, "Vessel not found");

        let e = ApiError::from_error(
            "Failed to create freight route",
            FreightDeskError::ValidationError("Route code is required".into()),
        );
        assert_eq!(e.status, StatusCode::BAD_REQUEST);

        let e = ApiError::from_error(
            "Failed to fetch FFA data",
            FreightDeskError::UpstreamShape("Invalid response from FFA API".into()),
        );
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message, "Failed to fetch FFA data");
    }
}
