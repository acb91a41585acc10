//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Every lifecycle transition here is a single conditional UPDATE, so the
//! invariants (one-way item status, at most one claimant) hold even when two
//! requests race. When a conditional write matches no row the adapter
//! re-reads the row and uses the core lifecycle rules to report why.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use foodshare_core::achievements::AchievementDef;
use foodshare_core::domain::{
    Achievement, Donation, DonationStatus, FoodCategory, FoodItem, FoodStatus, User,
    UserCredentials,
};
use foodshare_core::lifecycle;
use foodshare_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct UserCredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl UserCredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct FoodItemRecord {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    quantity: String,
    category: String,
    storage_location: Option<String>,
    purchase_date: NaiveDate,
    expiry_date: NaiveDate,
    notes: Option<String>,
    status: String,
    status_changed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}
impl FoodItemRecord {
    fn to_domain(self) -> PortResult<FoodItem> {
        // Enum columns are written from the closed enums, so a bad value is a
        // corrupted row, not caller input.
        let category = FoodCategory::from_str(&self.category)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let status = FoodStatus::from_str(&self.status)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(FoodItem {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            quantity: self.quantity,
            category,
            storage_location: self.storage_location,
            purchase_date: self.purchase_date,
            expiry_date: self.expiry_date,
            notes: self.notes,
            status,
            status_changed_at: self.status_changed_at,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct DonationRecord {
    id: Uuid,
    food_item_id: Uuid,
    donor_id: Uuid,
    claimant_id: Option<Uuid>,
    quantity: String,
    pickup_location: String,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    claimed_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
}
impl DonationRecord {
    fn to_domain(self) -> PortResult<Donation> {
        let status = DonationStatus::from_str(&self.status)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Donation {
            id: self.id,
            food_item_id: self.food_item_id,
            donor_id: self.donor_id,
            claimant_id: self.claimant_id,
            quantity: self.quantity,
            pickup_location: self.pickup_location,
            description: self.description,
            status,
            created_at: self.created_at,
            claimed_at: self.claimed_at,
            delivered_at: self.delivered_at,
        })
    }
}

#[derive(FromRow)]
struct AchievementRecord {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    name: String,
    description: String,
    earned_at: DateTime<Utc>,
}
impl AchievementRecord {
    fn to_domain(self) -> Achievement {
        Achievement {
            id: self.id,
            user_id: self.user_id,
            kind: self.kind,
            name: self.name,
            description: self.description,
            earned_at: self.earned_at,
        }
    }
}

const FOOD_ITEM_COLUMNS: &str = "id, owner_id, name, quantity, category, storage_location, \
     purchase_date, expiry_date, notes, status, status_changed_at, created_at";

const DONATION_COLUMNS: &str = "id, food_item_id, donor_id, claimant_id, quantity, \
     pickup_location, description, status, created_at, claimed_at, delivered_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict("email is already registered".to_string())
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserCredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("User with email {} not found", email))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => unexpected(e),
        })?;
        Ok(user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_food_item(&self, item: FoodItem) -> PortResult<FoodItem> {
        let record = sqlx::query_as::<_, FoodItemRecord>(&format!(
            "INSERT INTO food_items ({FOOD_ITEM_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {FOOD_ITEM_COLUMNS}"
        ))
        .bind(item.id)
        .bind(item.owner_id)
        .bind(&item.name)
        .bind(&item.quantity)
        .bind(item.category.as_str())
        .bind(&item.storage_location)
        .bind(item.purchase_date)
        .bind(item.expiry_date)
        .bind(&item.notes)
        .bind(item.status.as_str())
        .bind(item.status_changed_at)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_food_item(&self, item_id: Uuid) -> PortResult<FoodItem> {
        let record = sqlx::query_as::<_, FoodItemRecord>(&format!(
            "SELECT {FOOD_ITEM_COLUMNS} FROM food_items WHERE id = $1"
        ))
        .bind(item_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Food item {} not found", item_id))
            }
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn list_food_items(&self, owner_id: Uuid) -> PortResult<Vec<FoodItem>> {
        let records = sqlx::query_as::<_, FoodItemRecord>(&format!(
            "SELECT {FOOD_ITEM_COLUMNS} FROM food_items WHERE owner_id = $1 \
             ORDER BY expiry_date ASC, created_at ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_expiring_items(
        &self,
        owner_id: Uuid,
        cutoff: NaiveDate,
    ) -> PortResult<Vec<FoodItem>> {
        let records = sqlx::query_as::<_, FoodItemRecord>(&format!(
            "SELECT {FOOD_ITEM_COLUMNS} FROM food_items \
             WHERE owner_id = $1 AND status = 'active' AND expiry_date <= $2 \
             ORDER BY expiry_date ASC"
        ))
        .bind(owner_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn set_food_status(
        &self,
        item_id: Uuid,
        owner_id: Uuid,
        new_status: FoodStatus,
        at: DateTime<Utc>,
    ) -> PortResult<FoodItem> {
        if !new_status.is_terminal() {
            return Err(PortError::Validation(format!(
                "'{new_status}' is not a valid target status"
            )));
        }

        // Compare-and-set: only an item still `active` takes the transition.
        let updated = sqlx::query_as::<_, FoodItemRecord>(&format!(
            "UPDATE food_items SET status = $1, status_changed_at = $2 \
             WHERE id = $3 AND owner_id = $4 AND status = 'active' \
             RETURNING {FOOD_ITEM_COLUMNS}"
        ))
        .bind(new_status.as_str())
        .bind(at)
        .bind(item_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        if let Some(record) = updated {
            return record.to_domain();
        }

        // Nothing matched; re-read to tell not-found, ownership and state apart.
        let current = self.get_food_item(item_id).await?;
        if current.owner_id != owner_id {
            return Err(PortError::Unauthorized);
        }
        lifecycle::validate_item_transition(current.status, new_status)
            .map_err(PortError::from)?;
        Err(PortError::Conflict(
            "item status changed concurrently".to_string(),
        ))
    }

    async fn list_terminal_items(&self, owner_id: Uuid) -> PortResult<Vec<FoodItem>> {
        let records = sqlx::query_as::<_, FoodItemRecord>(&format!(
            "SELECT {FOOD_ITEM_COLUMNS} FROM food_items \
             WHERE owner_id = $1 AND status IN ('consumed', 'wasted') \
             ORDER BY status_changed_at ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn count_items_with_status(
        &self,
        owner_id: Uuid,
        status: FoodStatus,
    ) -> PortResult<u32> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM food_items WHERE owner_id = $1 AND status = $2",
        )
        .bind(owner_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(count as u32)
    }

    async fn create_donation(&self, donation: Donation) -> PortResult<Donation> {
        let record = sqlx::query_as::<_, DonationRecord>(&format!(
            "INSERT INTO donations ({DONATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {DONATION_COLUMNS}"
        ))
        .bind(donation.id)
        .bind(donation.food_item_id)
        .bind(donation.donor_id)
        .bind(donation.claimant_id)
        .bind(&donation.quantity)
        .bind(&donation.pickup_location)
        .bind(&donation.description)
        .bind(donation.status.as_str())
        .bind(donation.created_at)
        .bind(donation.claimed_at)
        .bind(donation.delivered_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_donation(&self, donation_id: Uuid) -> PortResult<Donation> {
        let record = sqlx::query_as::<_, DonationRecord>(&format!(
            "SELECT {DONATION_COLUMNS} FROM donations WHERE id = $1"
        ))
        .bind(donation_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Donation {} not found", donation_id))
            }
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn list_available_donations(&self) -> PortResult<Vec<Donation>> {
        let records = sqlx::query_as::<_, DonationRecord>(&format!(
            "SELECT {DONATION_COLUMNS} FROM donations WHERE status = 'available' \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_donations_by_donor(&self, donor_id: Uuid) -> PortResult<Vec<Donation>> {
        let records = sqlx::query_as::<_, DonationRecord>(&format!(
            "SELECT {DONATION_COLUMNS} FROM donations WHERE donor_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_donations_by_claimant(
        &self,
        claimant_id: Uuid,
    ) -> PortResult<Vec<Donation>> {
        let records = sqlx::query_as::<_, DonationRecord>(&format!(
            "SELECT {DONATION_COLUMNS} FROM donations WHERE claimant_id = $1 \
             ORDER BY claimed_at DESC"
        ))
        .bind(claimant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn count_donations_by_donor(&self, donor_id: Uuid) -> PortResult<u32> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM donations WHERE donor_id = $1")
                .bind(donor_id)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(count as u32)
    }

    async fn claim_donation(
        &self,
        donation_id: Uuid,
        claimant_id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<Donation> {
        // The claim race is decided here: a single conditional write assigns
        // the claimant only while the donation is still available and
        // unclaimed. Of two simultaneous claims exactly one matches.
        let updated = sqlx::query_as::<_, DonationRecord>(&format!(
            "UPDATE donations SET status = 'claimed', claimant_id = $1, claimed_at = $2 \
             WHERE id = $3 AND status = 'available' AND claimant_id IS NULL \
               AND donor_id <> $1 \
             RETURNING {DONATION_COLUMNS}"
        ))
        .bind(claimant_id)
        .bind(at)
        .bind(donation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        if let Some(record) = updated {
            return record.to_domain();
        }

        let current = self.get_donation(donation_id).await?;
        lifecycle::validate_claim(&current, claimant_id).map_err(PortError::from)?;
        Err(PortError::Conflict(
            "donation was claimed by another user".to_string(),
        ))
    }

    async fn mark_delivered(
        &self,
        donation_id: Uuid,
        actor_id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<Donation> {
        let updated = sqlx::query_as::<_, DonationRecord>(&format!(
            "UPDATE donations SET status = 'delivered', delivered_at = $2 \
             WHERE id = $3 AND status = 'claimed' \
               AND (donor_id = $1 OR claimant_id = $1) \
             RETURNING {DONATION_COLUMNS}"
        ))
        .bind(actor_id)
        .bind(at)
        .bind(donation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        if let Some(record) = updated {
            return record.to_domain();
        }

        let current = self.get_donation(donation_id).await?;
        lifecycle::validate_deliver(&current, actor_id).map_err(PortError::from)?;
        Err(PortError::Conflict(
            "donation state changed concurrently".to_string(),
        ))
    }

    async fn award_achievement(
        &self,
        user_id: Uuid,
        def: &AchievementDef,
        at: DateTime<Utc>,
    ) -> PortResult<()> {
        // (user_id, name) is unique; re-awarding is a no-op.
        sqlx::query(
            "INSERT INTO achievements (id, user_id, kind, name, description, earned_at) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (user_id, name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(def.kind)
        .bind(def.name)
        .bind(def.description)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_achievements(&self, user_id: Uuid) -> PortResult<Vec<Achievement>> {
        let records = sqlx::query_as::<_, AchievementRecord>(
            "SELECT id, user_id, kind, name, description, earned_at FROM achievements \
             WHERE user_id = $1 ORDER BY earned_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
