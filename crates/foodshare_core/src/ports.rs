//! crates/foodshare_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::achievements::AchievementDef;
use crate::domain::{
    Achievement, Donation, FoodItem, FoodStatus, User, UserCredentials,
};
use crate::lifecycle::LifecycleError;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// A state-machine transition was attempted from the wrong state, or a
    /// claim race was lost.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

impl From<LifecycleError> for PortError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidTarget(_) => PortError::Validation(err.to_string()),
            LifecycleError::NotParty => PortError::Unauthorized,
            LifecycleError::AlreadyTerminal(_)
            | LifecycleError::NotDonatable(_)
            | LifecycleError::NotAvailable(_)
            | LifecycleError::OwnDonation
            | LifecycleError::NotClaimed(_) => PortError::Conflict(err.to_string()),
        }
    }
}

//=========================================================================================
// Service Port (Trait)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Food Inventory ---
    async fn create_food_item(&self, item: FoodItem) -> PortResult<FoodItem>;

    async fn get_food_item(&self, item_id: Uuid) -> PortResult<FoodItem>;

    async fn list_food_items(&self, owner_id: Uuid) -> PortResult<Vec<FoodItem>>;

    /// Active items whose expiry date falls on or before `cutoff`, soonest first.
    async fn list_expiring_items(
        &self,
        owner_id: Uuid,
        cutoff: NaiveDate,
    ) -> PortResult<Vec<FoodItem>>;

    /// The one-way terminal transition. Must be a conditional write: the row
    /// is updated only while its status is still `active`. Errors:
    /// `NotFound` for a missing item, `Unauthorized` when `owner_id` does not
    /// own it, `Conflict` when it already left `active`.
    async fn set_food_status(
        &self,
        item_id: Uuid,
        owner_id: Uuid,
        new_status: FoodStatus,
        at: DateTime<Utc>,
    ) -> PortResult<FoodItem>;

    /// Items in a terminal status, for the analytics aggregator.
    async fn list_terminal_items(&self, owner_id: Uuid) -> PortResult<Vec<FoodItem>>;

    async fn count_items_with_status(
        &self,
        owner_id: Uuid,
        status: FoodStatus,
    ) -> PortResult<u32>;

    // --- Donations ---
    async fn create_donation(&self, donation: Donation) -> PortResult<Donation>;

    async fn get_donation(&self, donation_id: Uuid) -> PortResult<Donation>;

    /// The public browse list: strictly `status = available`.
    async fn list_available_donations(&self) -> PortResult<Vec<Donation>>;

    async fn list_donations_by_donor(&self, donor_id: Uuid) -> PortResult<Vec<Donation>>;

    async fn list_donations_by_claimant(
        &self,
        claimant_id: Uuid,
    ) -> PortResult<Vec<Donation>>;

    async fn count_donations_by_donor(&self, donor_id: Uuid) -> PortResult<u32>;

    /// Claims a donation for `claimant_id`. Must be a single conditional
    /// write (`available` and unclaimed, claimant assigned atomically) so that
    /// of two simultaneous claims exactly one succeeds; the loser gets
    /// `Conflict`.
    async fn claim_donation(
        &self,
        donation_id: Uuid,
        claimant_id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<Donation>;

    /// Records delivery. Conditional on `claimed`, and `actor_id` must be the
    /// donor or the claimant.
    async fn mark_delivered(
        &self,
        donation_id: Uuid,
        actor_id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<Donation>;

    // --- Achievements ---
    /// Awards `def` to the user unless already earned; awarding twice is a no-op.
    async fn award_achievement(
        &self,
        user_id: Uuid,
        def: &AchievementDef,
        at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn list_achievements(&self, user_id: Uuid) -> PortResult<Vec<Achievement>>;
}
