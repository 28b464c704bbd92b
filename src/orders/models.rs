//! Order Models
//! Mission: Define order records and their wire representations

use serde::{Deserialize, Serialize};

/// Pizza size choices
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PizzaSize {
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "large")]
    Large,
    #[serde(rename = "extra-large")]
    ExtraLarge,
}

impl PizzaSize {
    pub fn as_str(&self) -> &str {
        match self {
            PizzaSize::Small => "small",
            PizzaSize::Medium => "medium",
            PizzaSize::Large => "large",
            PizzaSize::ExtraLarge => "extra-large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "small" => Some(PizzaSize::Small),
            "medium" => Some(PizzaSize::Medium),
            "large" => Some(PizzaSize::Large),
            "extra-large" => Some(PizzaSize::ExtraLarge),
            _ => None,
        }
    }
}

/// Order lifecycle states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "delivered")]
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "in-progress" => Some(OrderStatus::InProgress),
            "delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }
}

/// Order record. `owner` carries the owning user's username, joined in by
/// the store for response shaping.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub quantity: u32,
    pub status: OrderStatus,
    pub size: PizzaSize,
    pub flavour: bool,
    pub user_id: i64,
    pub owner: String,
}

/// Body for placing or updating an order. Any status supplied by the
/// client is ignored; new orders always start pending.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub quantity: u32,
    pub pizza_size: PizzaSize,
    pub flavour: bool,
}

/// Order projection returned to clients. `user_id` exposes the owner's
/// username, never the numeric key.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub user_id: String,
    pub quantity: u32,
    pub pizza_size: PizzaSize,
    pub flavour: bool,
    pub order_status: OrderStatus,
}

impl OrderView {
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id,
            user_id: order.owner.clone(),
            quantity: order.quantity,
            pizza_size: order.size,
            flavour: order.flavour,
            order_status: order.status,
        }
    }
}

/// Response carrying a single order under a `detail` confirmation.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub detail: String,
    pub order: OrderView,
    pub date_time: String,
}

/// Response carrying a single order under a `message`.
#[derive(Debug, Serialize)]
pub struct OrderMessageResponse {
    pub message: String,
    pub order: OrderView,
    pub date_time: String,
}

/// Response carrying a list of orders.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub message: String,
    pub orders: Vec<OrderView>,
    pub date_time: String,
}

/// Response for deletions.
#[derive(Debug, Serialize)]
pub struct OrderDeletedResponse {
    pub detail: String,
    pub date_time: String,
}
