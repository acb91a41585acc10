//! services/api/src/web/analytics.rs
//!
//! Read-only analytics endpoints. Each response is recomputed from stored
//! transitions on every call; nothing here is cached or persisted.

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::web::state::AppState;
use foodshare_core::analytics;
use foodshare_core::domain::FoodStatus;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// Monthly consumed/wasted counts; the three arrays are index-aligned.
#[derive(Serialize, ToSchema)]
pub struct WasteTrendResponse {
    pub months: Vec<String>,
    pub consumed: Vec<u32>,
    pub wasted: Vec<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryBreakdownEntry {
    pub category: String,
    pub consumed: u32,
    pub wasted: u32,
    pub waste_percentage: f64,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_items: u32,
    pub active: u32,
    pub consumed: u32,
    pub wasted: u32,
    pub waste_percentage: f64,
    pub consumption_percentage: f64,
}

#[derive(Serialize, ToSchema)]
pub struct EnvironmentalImpactResponse {
    pub co2_saved_kg: f64,
    pub water_saved_liters: u64,
    pub meals_saved: u32,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /analytics/api/waste_trend - Terminal transitions per month
#[utoipa::path(
    get,
    path = "/analytics/api/waste_trend",
    responses(
        (status = 200, description = "Monthly trend, oldest month first", body = WasteTrendResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn waste_trend_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<WasteTrendResponse>> {
    let items = state.db.list_terminal_items(user_id).await?;
    let trend =
        analytics::monthly_trend(&items, state.clock.today(), state.config.trend_months);
    Ok(Json(WasteTrendResponse {
        months: trend.months,
        consumed: trend.consumed,
        wasted: trend.wasted,
    }))
}

/// GET /analytics/api/category_breakdown - Waste share per category
#[utoipa::path(
    get,
    path = "/analytics/api/category_breakdown",
    responses(
        (status = 200, description = "One entry per category", body = [CategoryBreakdownEntry]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn category_breakdown_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<Vec<CategoryBreakdownEntry>>> {
    let items = state.db.list_terminal_items(user_id).await?;
    let breakdown = analytics::category_breakdown(&items);
    Ok(Json(
        breakdown
            .into_iter()
            .map(|entry| CategoryBreakdownEntry {
                category: entry.category.as_str().to_string(),
                consumed: entry.consumed,
                wasted: entry.wasted,
                waste_percentage: entry.waste_percentage,
            })
            .collect(),
    ))
}

/// GET /analytics/api/stats - Inventory-wide status tallies
#[utoipa::path(
    get,
    path = "/analytics/api/stats",
    responses(
        (status = 200, description = "Summary statistics", body = StatsResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<StatsResponse>> {
    let items = state.db.list_food_items(user_id).await?;
    let stats = analytics::waste_stats(&items);
    Ok(Json(StatsResponse {
        total_items: stats.total_items,
        active: stats.active,
        consumed: stats.consumed,
        wasted: stats.wasted,
        waste_percentage: stats.waste_percentage,
        consumption_percentage: stats.consumption_percentage,
    }))
}

/// GET /analytics/api/environmental_impact - Estimated impact of waste
#[utoipa::path(
    get,
    path = "/analytics/api/environmental_impact",
    responses(
        (status = 200, description = "Rough environmental estimates", body = EnvironmentalImpactResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn environmental_impact_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<EnvironmentalImpactResponse>> {
    let wasted = state
        .db
        .count_items_with_status(user_id, FoodStatus::Wasted)
        .await?;
    let impact = analytics::environmental_impact(wasted);
    Ok(Json(EnvironmentalImpactResponse {
        co2_saved_kg: impact.co2_saved_kg,
        water_saved_liters: impact.water_saved_liters,
        meals_saved: impact.meals_saved,
    }))
}
