//! crates/foodshare_core/src/lifecycle.rs
//!
//! Transition rules for the two state machines in the system: the one-way
//! food item status and the strictly forward donation lifecycle. These checks
//! are pure; the persistence layer enforces the same conditions with
//! conditional writes, and uses these functions to diagnose why a
//! conditional write matched no row.

use uuid::Uuid;

use crate::domain::{Donation, DonationStatus, FoodItem, FoodStatus};

/// Why a requested transition is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The requested food status is not a terminal state.
    #[error("'{0}' is not a valid target status")]
    InvalidTarget(FoodStatus),
    /// The item already left `active`; terminal states are final, and
    /// re-submitting the same terminal status is still a conflict.
    #[error("item is already {0}")]
    AlreadyTerminal(FoodStatus),
    /// The item is not `active`, so it cannot be offered as a donation.
    #[error("item is {0} and cannot be donated")]
    NotDonatable(FoodStatus),
    /// The donation already left `available`.
    #[error("donation is {0}, not available")]
    NotAvailable(DonationStatus),
    /// Donors cannot claim their own donation.
    #[error("cannot claim your own donation")]
    OwnDonation,
    /// Delivery can only be recorded from `claimed`.
    #[error("donation is {0}, not claimed")]
    NotClaimed(DonationStatus),
    /// Only the donor or the claimant may mark delivery.
    #[error("actor is not a party to this donation")]
    NotParty,
}

/// Checks `active -> consumed|wasted`. The only legal transitions an item
/// ever makes, and each item makes exactly one of them.
pub fn validate_item_transition(
    current: FoodStatus,
    requested: FoodStatus,
) -> Result<(), LifecycleError> {
    if !requested.is_terminal() {
        return Err(LifecycleError::InvalidTarget(requested));
    }
    match current {
        FoodStatus::Active => Ok(()),
        terminal => Err(LifecycleError::AlreadyTerminal(terminal)),
    }
}

/// Checks that an item can be the source of a new donation.
pub fn validate_donate(item: &FoodItem) -> Result<(), LifecycleError> {
    match item.status {
        FoodStatus::Active => Ok(()),
        other => Err(LifecycleError::NotDonatable(other)),
    }
}

/// Checks `available -> claimed` for the given claimant.
pub fn validate_claim(donation: &Donation, claimant_id: Uuid) -> Result<(), LifecycleError> {
    if donation.donor_id == claimant_id {
        return Err(LifecycleError::OwnDonation);
    }
    match donation.status {
        DonationStatus::Available => Ok(()),
        other => Err(LifecycleError::NotAvailable(other)),
    }
}

/// Checks `claimed -> delivered` for the given actor. Either party to the
/// donation may record delivery.
pub fn validate_deliver(donation: &Donation, actor_id: Uuid) -> Result<(), LifecycleError> {
    let is_party =
        donation.donor_id == actor_id || donation.claimant_id == Some(actor_id);
    if !is_party {
        return Err(LifecycleError::NotParty);
    }
    match donation.status {
        DonationStatus::Claimed => Ok(()),
        other => Err(LifecycleError::NotClaimed(other)),
    }
}
