//! services/api/src/web/rest.rs
//!
//! Assembles the application router and holds the master definition for the
//! OpenAPI specification.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::web::achievements::{self, list_achievements_handler};
use crate::web::analytics::{
    self, category_breakdown_handler, environmental_impact_handler, stats_handler,
    waste_trend_handler,
};
use crate::web::auth::{self, login_handler, logout_handler, signup_handler};
use crate::web::donations::{
    self, claim_donation_handler, create_donation_handler, deliver_donation_handler,
    list_available_handler, my_claims_handler, my_donations_handler,
};
use crate::web::food::{
    self, create_food_handler, expiring_food_handler, list_food_handler,
    update_status_handler,
};
use crate::web::middleware::require_auth;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        food::create_food_handler,
        food::list_food_handler,
        food::expiring_food_handler,
        food::update_status_handler,
        donations::create_donation_handler,
        donations::list_available_handler,
        donations::my_donations_handler,
        donations::my_claims_handler,
        donations::claim_donation_handler,
        donations::deliver_donation_handler,
        analytics::waste_trend_handler,
        analytics::category_breakdown_handler,
        analytics::stats_handler,
        analytics::environmental_impact_handler,
        achievements::list_achievements_handler,
    ),
    components(schemas(
        auth::SignupRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        food::CreateFoodItemRequest,
        food::FoodItemResponse,
        food::InventoryResponse,
        food::TerminalStatus,
        food::UpdateStatusRequest,
        food::UpdateStatusResponse,
        donations::CreateDonationRequest,
        donations::DonationResponse,
        analytics::WasteTrendResponse,
        analytics::CategoryBreakdownEntry,
        analytics::StatsResponse,
        analytics::EnvironmentalImpactResponse,
        achievements::AchievementResponse,
    )),
    tags(
        (name = "FoodShare API", description = "Food inventory tracking, donations, and waste analytics.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router Assembly
//=========================================================================================

/// Builds the full application router over the given state. Shared between
/// the server binary and the integration tests.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/food", post(create_food_handler).get(list_food_handler))
        .route("/food/expiring", get(expiring_food_handler))
        .route("/food/update_status/{item_id}", post(update_status_handler))
        .route(
            "/donations",
            post(create_donation_handler).get(list_available_handler),
        )
        .route("/donations/mine", get(my_donations_handler))
        .route("/donations/claims", get(my_claims_handler))
        .route("/donations/claim/{donation_id}", post(claim_donation_handler))
        .route(
            "/donations/deliver/{donation_id}",
            post(deliver_donation_handler),
        )
        .route("/analytics/api/waste_trend", get(waste_trend_handler))
        .route(
            "/analytics/api/category_breakdown",
            get(category_breakdown_handler),
        )
        .route("/analytics/api/stats", get(stats_handler))
        .route(
            "/analytics/api/environmental_impact",
            get(environmental_impact_handler),
        )
        .route("/achievements", get(list_achievements_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
