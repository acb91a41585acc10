//! services/api/src/web/donations.rs
//!
//! Handlers for the peer-to-peer donation workflow. The lifecycle is strictly
//! forward (`available -> claimed -> delivered`); the claim itself is decided
//! by a conditional write in the store, so two simultaneous claimants can
//! never both succeed.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::web::achievements::award_for_donation;
use crate::web::state::AppState;
use foodshare_core::domain::{Donation, DonationStatus};
use foodshare_core::lifecycle;
use foodshare_core::ports::PortError;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateDonationRequest {
    /// The inventory item being offered. Must be active and owned by the donor.
    pub food_item_id: Uuid,
    /// Defaults to the item's own quantity when omitted.
    pub quantity: Option<String>,
    pub pickup_location: String,
    pub description: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DonationResponse {
    pub id: Uuid,
    pub food_item_id: Uuid,
    pub donor_id: Uuid,
    pub claimant_id: Option<Uuid>,
    pub quantity: String,
    pub pickup_location: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl DonationResponse {
    fn from_domain(donation: &Donation) -> Self {
        Self {
            id: donation.id,
            food_item_id: donation.food_item_id,
            donor_id: donation.donor_id,
            claimant_id: donation.claimant_id,
            quantity: donation.quantity.clone(),
            pickup_location: donation.pickup_location.clone(),
            description: donation.description.clone(),
            status: donation.status.as_str().to_string(),
            created_at: donation.created_at,
            claimed_at: donation.claimed_at,
            delivered_at: donation.delivered_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /donations - Offer one of your items for donation
#[utoipa::path(
    post,
    path = "/donations",
    request_body = CreateDonationRequest,
    responses(
        (status = 201, description = "Donation created", body = DonationResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Item belongs to another user"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item is not active"),
        (status = 422, description = "Missing pickup location")
    )
)]
pub async fn create_donation_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateDonationRequest>,
) -> ApiResult<impl IntoResponse> {
    let pickup_location = req.pickup_location.trim();
    if pickup_location.is_empty() {
        return Err(
            PortError::Validation("pickup location must not be empty".to_string()).into(),
        );
    }

    let item = state.db.get_food_item(req.food_item_id).await?;
    if item.owner_id != user_id {
        return Err(PortError::Unauthorized.into());
    }
    lifecycle::validate_donate(&item).map_err(PortError::from)?;

    let donation = Donation {
        id: Uuid::new_v4(),
        food_item_id: item.id,
        donor_id: user_id,
        claimant_id: None,
        quantity: req.quantity.unwrap_or_else(|| item.quantity.clone()),
        pickup_location: pickup_location.to_string(),
        description: req.description,
        status: DonationStatus::Available,
        created_at: state.clock.now(),
        claimed_at: None,
        delivered_at: None,
    };
    let created = state.db.create_donation(donation).await?;

    // The donation exists at this point; a failed award only loses the badge.
    if let Err(e) = award_for_donation(&state, user_id).await {
        tracing::warn!("failed to award donation achievements: {e}");
    }

    Ok((
        StatusCode::CREATED,
        Json(DonationResponse::from_domain(&created)),
    ))
}

/// GET /donations - Browse available donations
///
/// Filters strictly on `available`; a claimed-but-undelivered donation never
/// shows up here.
#[utoipa::path(
    get,
    path = "/donations",
    responses(
        (status = 200, description = "Available donations, newest first", body = [DonationResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_available_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DonationResponse>>> {
    let donations = state.db.list_available_donations().await?;
    Ok(Json(
        donations.iter().map(DonationResponse::from_domain).collect(),
    ))
}

/// GET /donations/mine - Donations you created, all statuses
#[utoipa::path(
    get,
    path = "/donations/mine",
    responses(
        (status = 200, description = "Your donations", body = [DonationResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn my_donations_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<Vec<DonationResponse>>> {
    let donations = state.db.list_donations_by_donor(user_id).await?;
    Ok(Json(
        donations.iter().map(DonationResponse::from_domain).collect(),
    ))
}

/// GET /donations/claims - Donations you claimed, all statuses
#[utoipa::path(
    get,
    path = "/donations/claims",
    responses(
        (status = 200, description = "Your claims", body = [DonationResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn my_claims_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<Vec<DonationResponse>>> {
    let donations = state.db.list_donations_by_claimant(user_id).await?;
    Ok(Json(
        donations.iter().map(DonationResponse::from_domain).collect(),
    ))
}

/// POST /donations/claim/{donation_id} - Claim an available donation
///
/// Exactly one claimant can ever win; a lost race is answered with 409.
#[utoipa::path(
    post,
    path = "/donations/claim/{donation_id}",
    params(("donation_id" = Uuid, Path, description = "The donation to claim")),
    responses(
        (status = 200, description = "Donation claimed", body = DonationResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Donation not found"),
        (status = 409, description = "Already claimed, delivered, or your own donation")
    )
)]
pub async fn claim_donation_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(donation_id): Path<Uuid>,
) -> ApiResult<Json<DonationResponse>> {
    let donation = state
        .db
        .claim_donation(donation_id, user_id, state.clock.now())
        .await?;
    Ok(Json(DonationResponse::from_domain(&donation)))
}

/// POST /donations/deliver/{donation_id} - Record a completed handoff
///
/// Either party to the donation (donor or claimant) may mark delivery.
#[utoipa::path(
    post,
    path = "/donations/deliver/{donation_id}",
    params(("donation_id" = Uuid, Path, description = "The donation that was handed over")),
    responses(
        (status = 200, description = "Donation delivered", body = DonationResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not a party to this donation"),
        (status = 404, description = "Donation not found"),
        (status = 409, description = "Donation is not claimed")
    )
)]
pub async fn deliver_donation_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(donation_id): Path<Uuid>,
) -> ApiResult<Json<DonationResponse>> {
    let donation = state
        .db
        .mark_delivered(donation_id, user_id, state.clock.now())
        .await?;
    Ok(Json(DonationResponse::from_domain(&donation)))
}
