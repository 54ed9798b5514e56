// HTTP handlers for trading service endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::error::ApiError;
use crate::models::TradingService;
use crate::trading::{BookingError, CreateServiceOrder, ServiceOrderCreated};
use crate::AppState;

/// Handler for POST /api/services/order
/// Creates a booking and a payment order for a trading service
#[utoipa::path(
    post,
    path = "/api/services/order",
    request_body = CreateServiceOrder,
    responses(
        (status = 200, description = "Order created", body = ServiceOrderCreated),
        (status = 400, description = "Invalid request body"),
        (status = 404, description = "Service not found or inactive"),
        (status = 500, description = "Failed to create service order")
    ),
    tag = "services"
)]
pub async fn create_service_order_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateServiceOrder>,
) -> Result<Json<ServiceOrderCreated>, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let response = state.service_orders.create_order(request).await?;

    Ok(Json(response))
}

/// Handler for GET /api/services
/// Lists active trading services
#[utoipa::path(
    get,
    path = "/api/services",
    responses(
        (status = 200, description = "List of active services", body = Vec<TradingService>)
    ),
    tag = "services"
)]
pub async fn list_services_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<TradingService>>, BookingError> {
    let services = state.trading_services.list_active().await?;
    Ok(Json(services))
}

/// Handler for GET /api/services/:id
pub async fn get_service_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TradingService>, ApiError> {
    let service = state
        .trading_services
        .find_active(id)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Service".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(service))
}
