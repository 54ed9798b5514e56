// HTTP handlers for workshop endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::error::ApiError;
use crate::models::Workshop;
use crate::workshops::{CreateWorkshopOrder, WorkshopError, WorkshopOrderResponse};
use crate::AppState;

/// Handler for POST /api/workshops/order
/// Creates a payment order (paid workshops) or confirms a free registration
#[utoipa::path(
    post,
    path = "/api/workshops/order",
    request_body = CreateWorkshopOrder,
    responses(
        (status = 200, description = "Order created or free registration confirmed"),
        (status = 400, description = "Invalid request body"),
        (status = 404, description = "Workshop not found or inactive"),
        (status = 409, description = "Workshop full or duplicate application"),
        (status = 500, description = "Failed to create workshop order")
    ),
    tag = "workshops"
)]
pub async fn create_workshop_order_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkshopOrder>,
) -> Result<Json<WorkshopOrderResponse>, WorkshopError> {
    request
        .validate()
        .map_err(|e| WorkshopError::ValidationError(e.to_string()))?;

    let response = state.workshop_orders.create_order(request).await?;

    Ok(Json(response))
}

/// Handler for GET /api/workshops
/// Lists active workshops
#[utoipa::path(
    get,
    path = "/api/workshops",
    responses(
        (status = 200, description = "List of active workshops", body = Vec<Workshop>)
    ),
    tag = "workshops"
)]
pub async fn list_workshops_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Workshop>>, WorkshopError> {
    let workshops = state.workshops.list_active().await?;
    Ok(Json(workshops))
}

/// Handler for GET /api/workshops/:id
pub async fn get_workshop_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Workshop>, ApiError> {
    let workshop = state
        .workshops
        .find_active(id)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Workshop".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(workshop))
}
