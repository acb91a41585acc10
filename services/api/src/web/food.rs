//! services/api/src/web/food.rs
//!
//! Handlers for the personal food inventory: adding items, listing them with
//! expiry severities, expiry alerts, and the one-way status transition.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::web::achievements::award_for_consumption;
use crate::web::state::AppState;
use foodshare_core::domain::{FoodCategory, FoodItem, FoodStatus};
use foodshare_core::expiry::ExpiryTier;
use foodshare_core::ports::PortError;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateFoodItemRequest {
    pub name: String,
    pub quantity: Option<String>,
    /// One of the closed category set, e.g. "Dairy". Unknown values are rejected.
    pub category: String,
    pub storage_location: Option<String>,
    /// Defaults to today when omitted.
    pub purchase_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    pub notes: Option<String>,
}

/// A food item as rendered to clients, with the expiry severity already
/// computed so every surface shows the same tier.
#[derive(Serialize, ToSchema)]
pub struct FoodItemResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity: String,
    pub category: String,
    pub storage_location: Option<String>,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub notes: Option<String>,
    pub status: String,
    pub status_changed_at: Option<DateTime<Utc>>,
    pub days_until_expiry: i64,
    pub expiry_tier: String,
    pub created_at: DateTime<Utc>,
}

impl FoodItemResponse {
    pub fn from_domain(item: &FoodItem, today: NaiveDate) -> Self {
        let days = item.days_until_expiry(today);
        Self {
            id: item.id,
            name: item.name.clone(),
            quantity: item.quantity.clone(),
            category: item.category.as_str().to_string(),
            storage_location: item.storage_location.clone(),
            purchase_date: item.purchase_date,
            expiry_date: item.expiry_date,
            notes: item.notes.clone(),
            status: item.status.as_str().to_string(),
            status_changed_at: item.status_changed_at,
            days_until_expiry: days,
            expiry_tier: ExpiryTier::classify(days).as_str().to_string(),
            created_at: item.created_at,
        }
    }
}

/// The inventory listing plus the dashboard summary counts.
#[derive(Serialize, ToSchema)]
pub struct InventoryResponse {
    pub items: Vec<FoodItemResponse>,
    pub total_items: u32,
    pub active_count: u32,
    pub expiring_soon_count: u32,
    pub expired_count: u32,
}

/// The closed set of statuses a client may request. Anything else fails
/// deserialization before it reaches the handler.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStatus {
    Consumed,
    Wasted,
}

impl From<TerminalStatus> for FoodStatus {
    fn from(status: TerminalStatus) -> Self {
        match status {
            TerminalStatus::Consumed => FoodStatus::Consumed,
            TerminalStatus::Wasted => FoodStatus::Wasted,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: TerminalStatus,
}

/// The mutation response carries the updated item so clients re-render from
/// it instead of reloading the page.
#[derive(Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub item: FoodItemResponse,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /food - Add a new item to the inventory
#[utoipa::path(
    post,
    path = "/food",
    request_body = CreateFoodItemRequest,
    responses(
        (status = 201, description = "Item created", body = FoodItemResponse),
        (status = 401, description = "Not logged in"),
        (status = 422, description = "Invalid field value")
    )
)]
pub async fn create_food_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateFoodItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(PortError::Validation("name must not be empty".to_string()).into());
    }
    let category = FoodCategory::from_str(&req.category)
        .map_err(|e| PortError::Validation(e.to_string()))?;

    let today = state.clock.today();
    let purchase_date = req.purchase_date.unwrap_or(today);
    // The client-side check, repeated here; the data layer itself does not
    // enforce this ordering.
    if req.expiry_date < purchase_date {
        return Err(PortError::Validation(
            "expiry date must not precede the purchase date".to_string(),
        )
        .into());
    }

    let item = FoodItem {
        id: Uuid::new_v4(),
        owner_id: user_id,
        name: name.to_string(),
        quantity: req.quantity.unwrap_or_else(|| "1".to_string()),
        category,
        storage_location: req.storage_location,
        purchase_date,
        expiry_date: req.expiry_date,
        notes: req.notes,
        status: FoodStatus::Active,
        status_changed_at: None,
        created_at: state.clock.now(),
    };
    let created = state.db.create_food_item(item).await?;

    Ok((
        StatusCode::CREATED,
        Json(FoodItemResponse::from_domain(&created, today)),
    ))
}

/// GET /food - The user's inventory with summary counts
#[utoipa::path(
    get,
    path = "/food",
    responses(
        (status = 200, description = "Inventory listing", body = InventoryResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_food_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<InventoryResponse>> {
    let items = state.db.list_food_items(user_id).await?;
    let today = state.clock.today();
    let window = state.config.expiring_window_days;

    let active: Vec<&FoodItem> = items
        .iter()
        .filter(|i| i.status == FoodStatus::Active)
        .collect();
    let expired_count = active
        .iter()
        .filter(|i| i.days_until_expiry(today) <= 0)
        .count() as u32;
    let expiring_soon_count = active
        .iter()
        .filter(|i| {
            let days = i.days_until_expiry(today);
            days > 0 && days <= window
        })
        .count() as u32;

    Ok(Json(InventoryResponse {
        total_items: items.len() as u32,
        active_count: active.len() as u32,
        expiring_soon_count,
        expired_count,
        items: items
            .iter()
            .map(|i| FoodItemResponse::from_domain(i, today))
            .collect(),
    }))
}

/// GET /food/expiring - Active items expiring within the alert window
#[utoipa::path(
    get,
    path = "/food/expiring",
    responses(
        (status = 200, description = "Items expiring soon, soonest first", body = [FoodItemResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn expiring_food_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<Vec<FoodItemResponse>>> {
    let today = state.clock.today();
    let cutoff = today + Duration::days(state.config.expiring_window_days);
    let items = state.db.list_expiring_items(user_id, cutoff).await?;
    Ok(Json(
        items
            .iter()
            .map(|i| FoodItemResponse::from_domain(i, today))
            .collect(),
    ))
}

/// POST /food/update_status/{item_id} - Mark an item consumed or wasted
///
/// The transition is one-way: any further attempt, including re-submitting
/// the same terminal status, is answered with 409.
#[utoipa::path(
    post,
    path = "/food/update_status/{item_id}",
    request_body = UpdateStatusRequest,
    params(("item_id" = Uuid, Path, description = "The item to transition")),
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Item belongs to another user"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item is already in a terminal status"),
        (status = 422, description = "Unrecognized status value")
    )
)]
pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<UpdateStatusResponse>> {
    let new_status = FoodStatus::from(req.status);
    let item = state
        .db
        .set_food_status(item_id, user_id, new_status, state.clock.now())
        .await?;

    // The transition is already persisted; a failed award must not turn the
    // response into an error.
    if new_status == FoodStatus::Consumed {
        if let Err(e) = award_for_consumption(&state, user_id).await {
            tracing::warn!("failed to award consumption achievements: {e}");
        }
    }

    Ok(Json(UpdateStatusResponse {
        success: true,
        item: FoodItemResponse::from_domain(&item, state.clock.today()),
    }))
}
