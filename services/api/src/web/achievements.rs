//! services/api/src/web/achievements.rs
//!
//! Achievement listing, plus the award hooks the mutation handlers call
//! after a donation is created or an item is consumed.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::web::state::AppState;
use foodshare_core::achievements;
use foodshare_core::domain::FoodStatus;

#[derive(Serialize, ToSchema)]
pub struct AchievementResponse {
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

/// GET /achievements - Achievements earned by the current user
#[utoipa::path(
    get,
    path = "/achievements",
    responses(
        (status = 200, description = "Earned achievements, oldest first", body = [AchievementResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_achievements_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> ApiResult<Json<Vec<AchievementResponse>>> {
    let earned = state.db.list_achievements(user_id).await?;
    Ok(Json(
        earned
            .into_iter()
            .map(|a| AchievementResponse {
                id: a.id,
                kind: a.kind,
                name: a.name,
                description: a.description,
                earned_at: a.earned_at,
            })
            .collect(),
    ))
}

/// Awards donation-related achievements after a donation was created.
pub async fn award_for_donation(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    let donations = state.db.count_donations_by_donor(user_id).await?;
    for kind in ["donation", "community"] {
        for def in achievements::earned(kind, donations) {
            state
                .db
                .award_achievement(user_id, def, state.clock.now())
                .await?;
        }
    }
    Ok(())
}

/// Awards consumption-related achievements after an item was consumed.
/// "Waste prevention" counts consumed items plus donations made.
pub async fn award_for_consumption(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    let consumed = state
        .db
        .count_items_with_status(user_id, FoodStatus::Consumed)
        .await?;
    for def in achievements::earned("consumption", consumed) {
        state
            .db
            .award_achievement(user_id, def, state.clock.now())
            .await?;
    }

    let donations = state.db.count_donations_by_donor(user_id).await?;
    for def in achievements::earned("waste_prevention", consumed + donations) {
        state
            .db
            .award_achievement(user_id, def, state.clock.now())
            .await?;
    }
    Ok(())
}
