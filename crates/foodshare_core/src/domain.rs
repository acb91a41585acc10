//! crates/foodshare_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when a stored or submitted string does not name a known
/// enum variant. Unknown values are rejected at the boundary, never persisted.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// The closed set of food categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodCategory {
    Fruits,
    Vegetables,
    Dairy,
    Meat,
    Grains,
    Beverages,
    Other,
}

impl FoodCategory {
    /// Every category, in display order. Analytics iterate this so that
    /// categories with no recorded items still appear with zero counts.
    pub const ALL: [FoodCategory; 7] = [
        FoodCategory::Fruits,
        FoodCategory::Vegetables,
        FoodCategory::Dairy,
        FoodCategory::Meat,
        FoodCategory::Grains,
        FoodCategory::Beverages,
        FoodCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Fruits => "Fruits",
            FoodCategory::Vegetables => "Vegetables",
            FoodCategory::Dairy => "Dairy",
            FoodCategory::Meat => "Meat",
            FoodCategory::Grains => "Grains",
            FoodCategory::Beverages => "Beverages",
            FoodCategory::Other => "Other",
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FoodCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fruits" => Ok(FoodCategory::Fruits),
            "Vegetables" => Ok(FoodCategory::Vegetables),
            "Dairy" => Ok(FoodCategory::Dairy),
            "Meat" => Ok(FoodCategory::Meat),
            "Grains" => Ok(FoodCategory::Grains),
            "Beverages" => Ok(FoodCategory::Beverages),
            "Other" => Ok(FoodCategory::Other),
            other => Err(UnknownVariant {
                kind: "food category",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a food item. An item starts `Active` and moves
/// exactly once to one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodStatus {
    Active,
    Consumed,
    Wasted,
}

impl FoodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodStatus::Active => "active",
            FoodStatus::Consumed => "consumed",
            FoodStatus::Wasted => "wasted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FoodStatus::Consumed | FoodStatus::Wasted)
    }
}

impl fmt::Display for FoodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FoodStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(FoodStatus::Active),
            "consumed" => Ok(FoodStatus::Consumed),
            "wasted" => Ok(FoodStatus::Wasted),
            other => Err(UnknownVariant {
                kind: "food status",
                value: other.to_string(),
            }),
        }
    }
}

/// A single inventory item owned by one user.
#[derive(Debug, Clone)]
pub struct FoodItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub quantity: String,
    pub category: FoodCategory,
    pub storage_location: Option<String>,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub notes: Option<String>,
    pub status: FoodStatus,
    /// Set once, when the item leaves `Active`.
    pub status_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FoodItem {
    /// Whole days until the expiry date. Negative once the item is past it.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }
}

/// Lifecycle status of a donation: strictly forward, `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationStatus {
    Available,
    Claimed,
    Delivered,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Available => "available",
            DonationStatus::Claimed => "claimed",
            DonationStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(DonationStatus::Available),
            "claimed" => Ok(DonationStatus::Claimed),
            "delivered" => Ok(DonationStatus::Delivered),
            other => Err(UnknownVariant {
                kind: "donation status",
                value: other.to_string(),
            }),
        }
    }
}

/// A food item offered to other users. Carries its own lifecycle,
/// independent of the source item's status. The food item reference is
/// informational only; donations are never deleted.
#[derive(Debug, Clone)]
pub struct Donation {
    pub id: Uuid,
    pub food_item_id: Uuid,
    pub donor_id: Uuid,
    /// At most one claimant, ever. Null until the donation is claimed.
    pub claimant_id: Option<Uuid>,
    pub quantity: String,
    pub pickup_location: String,
    pub description: Option<String>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// An achievement a user has earned. Awarded at most once per name.
#[derive(Debug, Clone)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub name: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}
