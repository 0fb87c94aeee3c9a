use crate::types::*;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Account DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRoleRequest {
    pub role: UserRole,
}

// Catalog DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVariationRequest {
    #[validate(length(min = 1, max = 50))]
    pub color: String,

    #[validate(length(min = 1, max = 50))]
    pub size: String,

    #[validate(range(min = 0, max = 1000000))]
    pub stock: i32,

    #[serde(default)]
    pub price_adjustment: Decimal,
}

/// Partial edit of one variation; omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVariationRequest {
    #[validate(length(min = 1, max = 50))]
    pub color: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub size: Option<String>,

    #[validate(range(min = 0, max = 1000000))]
    pub stock: Option<i32>,

    pub price_adjustment: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub description: Option<String>,

    pub price: Decimal,

    #[validate(range(min = 0, max = 1000000))]
    pub stock: i32,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[serde(default)]
    pub variations: Vec<CreateVariationRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub price: Option<Decimal>,

    #[validate(range(min = 0, max = 1000000))]
    pub stock: Option<i32>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSort {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    DateAsc,
    DateDesc,
    Rating,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<ItemSort>,
    /// `new` (newest first) or `top_rated`; an explicit `sort_by` wins.
    pub filter: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// Cart DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub item_id: Uuid,

    #[validate(range(min = 1, max = 1000000, message = "quantity must be between 1 and 1000000"))]
    pub quantity: i32,

    #[validate]
    pub variation: Variation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, max = 1000000, message = "quantity must be between 1 and 1000000"))]
    pub quantity: i32,

    #[validate]
    pub variation: Variation,

    pub selected: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RemoveFromCartRequest {
    #[validate]
    pub variation: Variation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 255, message = "shipping_address is required"))]
    pub shipping_address: String,

    #[validate(length(min = 1, max = 50, message = "payment_method is required"))]
    pub payment_method: String,
}

// Order DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    #[validate(range(min = 1, max = 1000000, message = "quantity must be between 1 and 1000000"))]
    pub quantity: i32,

    #[validate(length(min = 1, max = 255, message = "shipping_address is required"))]
    pub shipping_address: String,

    /// Validated by the order service when present.
    pub variation: Option<Variation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

// Review / report DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(min = 1, max = 1000))]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub reason: String,

    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReportRequest {
    pub status: ReportStatus,
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub remove_item: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    /// `pending` (default), `reviewed`, `resolved` or `all`.
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// Shop DTOs
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateShopRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(email)]
    pub contact_email: Option<String>,

    #[validate(length(max = 20))]
    pub contact_phone: Option<String>,

    #[validate(length(max = 255))]
    pub address: Option<String>,
}

// Account DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddressRequest {
    #[validate(length(min = 1, max = 255))]
    pub address_line1: String,

    #[validate(length(max = 255))]
    pub address_line2: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    #[validate(length(min = 1, max = 100))]
    pub state: String,

    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,

    #[validate(length(min = 1, max = 100))]
    pub country: String,

    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAddressRequest {
    #[validate(length(min = 1, max = 255))]
    pub address_line1: Option<String>,

    #[validate(length(max = 255))]
    pub address_line2: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,

    #[validate(length(min = 1, max = 20))]
    pub postal_code: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,

    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteAccountRequest {
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessQuery {
    /// `pending`, `approved`, `rejected` or `all` (default).
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectBusinessRequest {
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

// Common response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}
