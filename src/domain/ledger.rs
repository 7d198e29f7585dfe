//! Ledger entries: immutable payment-promise records.
//!
//! A [`LedgerEntry`] is written exactly once, at successful claim, iff the
//! ride promises a positive amount. It is a permanent accountability record:
//! no operation in this crate edits or deletes one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ride::{PaymentType, Ride};
use super::{EntryId, RideId, UserId};
use crate::identity::UserProfile;

/// Immutable record of a payment promise exchanged for a ride.
///
/// Snapshots everything a history view needs at claim time; the originating
/// ride may move on to `completed` but the entry never changes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntry {
    /// Unique identifier, also the storage key.
    pub id: EntryId,
    /// Back-reference to the originating ride (non-owning).
    pub ride_id: RideId,

    /// Rider who owes the promise.
    pub rider_id: UserId,
    /// Rider display name at claim time.
    pub rider_name: String,
    /// Driver the promise is owed to.
    pub driver_id: UserId,
    /// Driver display name at claim time.
    pub driver_name: String,

    /// Kind of payment promised.
    pub payment_type: PaymentType,
    /// Promised amount; always positive (zero-amount claims record nothing).
    pub payment_amount: f64,

    /// Pickup location at claim time.
    pub pickup_location: String,
    /// Dropoff location at claim time.
    pub dropoff_location: String,
    /// Ride date as the rider provided it.
    pub date: String,
    /// Ride time as the rider provided it.
    pub time: String,

    /// Timestamp the promise was recorded (the claim time).
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Builds the entry for `driver` claiming `ride` at `claimed_at`.
    ///
    /// The caller is responsible for only recording entries when
    /// `ride.payment_amount > 0`.
    #[must_use]
    pub fn from_claim(ride: &Ride, driver: &UserProfile, claimed_at: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::generate(claimed_at, &driver.id),
            ride_id: ride.id.clone(),
            rider_id: ride.rider_id.clone(),
            rider_name: ride.rider_name.clone(),
            driver_id: driver.id.clone(),
            driver_name: driver.name.clone(),
            payment_type: ride.payment_type,
            payment_amount: ride.payment_amount,
            pickup_location: ride.pickup_location.clone(),
            dropoff_location: ride.dropoff_location.clone(),
            date: ride.date.clone(),
            time: ride.time.clone(),
            created_at: claimed_at,
        }
    }
}
