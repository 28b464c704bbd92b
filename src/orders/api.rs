//! Order API Endpoints
//! Mission: Place, list, update, and delete orders with ownership checks

use crate::auth::middleware::{require_staff, AuthError};
use crate::auth::models::{response_timestamp, User};
use crate::orders::models::{
    OrderDeletedResponse, OrderDetailResponse, OrderListResponse, OrderMessageResponse,
    OrderStatus, OrderView, PlaceOrderRequest,
};
use crate::orders::store::{OrderStore, OrderStoreError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Shared order state
#[derive(Clone)]
pub struct OrdersState {
    pub order_store: Arc<OrderStore>,
}

/// Place an order - POST /orders/
pub async fn place_order(
    State(state): State<OrdersState>,
    Extension(user): Extension<User>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetailResponse>), OrderApiError> {
    if payload.quantity == 0 {
        return Err(OrderApiError::InvalidQuantity);
    }

    let order = state
        .order_store
        .create(payload.quantity, payload.pizza_size, payload.flavour, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(OrderDetailResponse {
            detail: format!("Order placed successfully, order ID {}!", order.id),
            order: OrderView::from_order(&order),
            date_time: response_timestamp(),
        }),
    ))
}

/// List every order - GET /orders/ (staff only)
pub async fn list_all_orders(
    State(state): State<OrdersState>,
    Extension(user): Extension<User>,
) -> Result<Json<OrderListResponse>, OrderApiError> {
    require_staff(&user)?;

    let orders = state.order_store.list_all()?;

    Ok(Json(OrderListResponse {
        message: "List of all orders".to_string(),
        orders: orders.iter().map(OrderView::from_order).collect(),
        date_time: response_timestamp(),
    }))
}

/// Look up any order by id - GET /orders/:id (staff only)
pub async fn get_order_by_id(
    State(state): State<OrdersState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Json<OrderMessageResponse>, OrderApiError> {
    require_staff(&user)?;

    let order = state
        .order_store
        .find_by_id(id)?
        .ok_or(OrderApiError::NotFound)?;

    Ok(Json(OrderMessageResponse {
        message: "Order by ID retrieved successfully.".to_string(),
        order: OrderView::from_order(&order),
        date_time: response_timestamp(),
    }))
}

/// List the caller's orders - GET /orders/user/orders
pub async fn list_user_orders(
    State(state): State<OrdersState>,
    Extension(user): Extension<User>,
) -> Result<Json<OrderListResponse>, OrderApiError> {
    let orders = state.order_store.list_for_user(user.id)?;

    Ok(Json(OrderListResponse {
        message: "User orders retrieved successfully.".to_string(),
        orders: orders.iter().map(OrderView::from_order).collect(),
        date_time: response_timestamp(),
    }))
}

/// Look up one of the caller's orders - GET /orders/user/order/:id
pub async fn get_user_order(
    State(state): State<OrdersState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Json<OrderMessageResponse>, OrderApiError> {
    let order = state
        .order_store
        .find_by_id_for_user(id, user.id)?
        .ok_or(OrderApiError::NotFound)?;

    Ok(Json(OrderMessageResponse {
        message: "Order retrieved successfully.".to_string(),
        order: OrderView::from_order(&order),
        date_time: response_timestamp(),
    }))
}

/// Update an order's contents - PUT /orders/update/:id (owner only)
pub async fn update_order(
    State(state): State<OrdersState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<OrderDetailResponse>, OrderApiError> {
    if payload.quantity == 0 {
        return Err(OrderApiError::InvalidQuantity);
    }

    let order = state.order_store.update(
        id,
        payload.quantity,
        payload.pizza_size,
        payload.flavour,
        user.id,
    )?;

    Ok(Json(OrderDetailResponse {
        detail: format!("Order ID {} updated successfully!", order.id),
        order: OrderView::from_order(&order),
        date_time: response_timestamp(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub new_status: String,
}

/// Update an order's status - PUT /orders/status/:id (staff only)
pub async fn update_order_status(
    State(state): State<OrdersState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<OrderDetailResponse>, OrderApiError> {
    require_staff(&user)?;

    let status = OrderStatus::from_str(&query.new_status)
        .ok_or_else(|| OrderApiError::InvalidStatus(query.new_status.clone()))?;

    let order = state.order_store.update_status(id, status)?;

    Ok(Json(OrderDetailResponse {
        detail: format!(
            "Order ID {} status updated successfully to '{}'!",
            order.id,
            status.as_str()
        ),
        order: OrderView::from_order(&order),
        date_time: response_timestamp(),
    }))
}

/// Delete an order - DELETE /orders/delete/:id (owner only)
pub async fn delete_order(
    State(state): State<OrdersState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDeletedResponse>, OrderApiError> {
    state.order_store.delete(id, user.id)?;

    Ok(Json(OrderDeletedResponse {
        detail: format!("Order ID {} deleted successfully.", id),
        date_time: response_timestamp(),
    }))
}

/// Order API errors
#[derive(Debug)]
pub enum OrderApiError {
    Auth(AuthError),
    NotFound,
    InvalidQuantity,
    InvalidStatus(String),
    Internal(anyhow::Error),
}

impl From<AuthError> for OrderApiError {
    fn from(err: AuthError) -> Self {
        OrderApiError::Auth(err)
    }
}

impl From<OrderStoreError> for OrderApiError {
    fn from(err: OrderStoreError) -> Self {
        match err {
            OrderStoreError::NotFound => OrderApiError::NotFound,
            OrderStoreError::Database(err) => OrderApiError::Internal(err),
        }
    }
}

impl From<anyhow::Error> for OrderApiError {
    fn from(err: anyhow::Error) -> Self {
        OrderApiError::Internal(err)
    }
}

impl IntoResponse for OrderApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            OrderApiError::Auth(err) => return err.into_response(),
            OrderApiError::NotFound => (StatusCode::NOT_FOUND, "Order not found.".to_string()),
            OrderApiError::InvalidQuantity => (
                StatusCode::BAD_REQUEST,
                "Quantity must be at least 1".to_string(),
            ),
            OrderApiError::InvalidStatus(value) => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Invalid order status: '{}'. Expected one of: pending, in-progress, delivered",
                    value
                ),
            ),
            OrderApiError::Internal(err) => {
                error!("Order API error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_api_error_responses() {
        let not_found = OrderApiError::NotFound.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let bad_qty = OrderApiError::InvalidQuantity.into_response();
        assert_eq!(bad_qty.status(), StatusCode::BAD_REQUEST);

        let bad_status = OrderApiError::InvalidStatus("shipped".to_string()).into_response();
        assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);

        let internal = OrderApiError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_staff_failure_passes_through_as_forbidden() {
        let err: OrderApiError = AuthError::NotStaff.into();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_store_errors_map_to_api_errors() {
        let err: OrderApiError = OrderStoreError::NotFound.into();
        assert!(matches!(err, OrderApiError::NotFound));

        let err: OrderApiError = OrderStoreError::Database(anyhow::anyhow!("boom")).into();
        assert!(matches!(err, OrderApiError::Internal(_)));
    }
}
