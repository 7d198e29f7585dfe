//! Ride entity: the state-machine aggregate of the service.
//!
//! A [`Ride`] progresses `open → claimed → completed`, with `open →
//! cancelled` as the other exit. `completed` and `cancelled` are terminal.
//! Rider contact info is snapshotted at creation time and never re-fetched;
//! a later profile edit must not retroactively alter the record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{RideId, UserId};
use crate::identity::UserProfile;

/// Lifecycle status of a ride request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    /// Posted and waiting for a driver.
    Open,
    /// A driver has committed to the ride.
    Claimed,
    /// The ride happened; rating is now possible.
    Completed,
    /// Withdrawn by the rider before anyone claimed it.
    Cancelled,
}

impl RideStatus {
    /// Returns `true` for statuses no transition may leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "open",
            Self::Claimed => "claimed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// Kind of payment promised for a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentType {
    /// No payment promised; the amount is always 0.
    Free,
    /// Campus meal swipes.
    MealSwipes,
    /// Campus dining dollars.
    DiningDollars,
    /// Cash.
    Cash,
}

/// Rider-supplied fields for a new ride request, before validation.
#[derive(Debug, Clone)]
pub struct RideDraft {
    /// Free-text pickup location.
    pub pickup_location: String,
    /// Free-text dropoff location.
    pub dropoff_location: String,
    /// Calendar date as provided (no timezone normalization).
    pub date: String,
    /// Time of day as provided.
    pub time: String,
    /// Kind of payment promised.
    pub payment_type: PaymentType,
    /// Promised amount; `None` defaults to 0.
    pub payment_amount: Option<f64>,
}

/// A single ride request posted by a rider.
///
/// The struct is the unit of storage: it serializes to the JSON value kept
/// under its own [`RideId`] key and round-trips unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Ride {
    /// Unique identifier, also the storage key (immutable after creation).
    pub id: RideId,

    /// Requesting rider's stable identifier.
    pub rider_id: UserId,
    /// Rider display name, snapshotted at creation.
    pub rider_name: String,
    /// Rider phone number, snapshotted at creation.
    pub rider_phone: String,
    /// Rider college email, snapshotted at creation.
    pub rider_college_email: String,

    /// Free-text pickup location.
    pub pickup_location: String,
    /// Free-text dropoff location.
    pub dropoff_location: String,
    /// Calendar date as provided by the rider (no timezone normalization).
    pub date: String,
    /// Time of day as provided by the rider.
    pub time: String,

    /// Kind of payment promised.
    pub payment_type: PaymentType,
    /// Promised amount; always 0 when `payment_type` is [`PaymentType::Free`].
    pub payment_amount: f64,

    /// Current lifecycle status.
    pub status: RideStatus,
    /// Claiming driver's identifier; `Some` iff status is claimed or completed.
    pub driver_id: Option<UserId>,
    /// Claiming driver's display name, snapshotted at claim.
    pub driver_name: Option<String>,

    /// Whether a post-completion rating has been recorded.
    pub rated: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Claim timestamp, set on the open → claimed transition.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Completion timestamp, set on the claimed → completed transition.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Ride {
    /// Builds a new open ride for `rider`, snapshotting their contact info.
    ///
    /// The identifier is derived from `created_at` and the rider, so the
    /// caller fixes the timestamp once and both stay consistent. A free
    /// ride stores amount 0 regardless of what was submitted.
    #[must_use]
    pub fn new(rider: &UserProfile, draft: RideDraft, created_at: DateTime<Utc>) -> Self {
        let payment_amount = if draft.payment_type == PaymentType::Free {
            0.0
        } else {
            draft.payment_amount.unwrap_or(0.0)
        };
        Self {
            id: RideId::generate(created_at, &rider.id),
            rider_id: rider.id.clone(),
            rider_name: rider.name.clone(),
            rider_phone: rider.phone.clone(),
            rider_college_email: rider.college_email.clone(),
            pickup_location: draft.pickup_location,
            dropoff_location: draft.dropoff_location,
            date: draft.date,
            time: draft.time,
            payment_type: draft.payment_type,
            payment_amount,
            status: RideStatus::Open,
            driver_id: None,
            driver_name: None,
            rated: false,
            created_at,
            claimed_at: None,
            completed_at: None,
        }
    }

    /// Returns `true` if `user` is the rider or the claiming driver.
    #[must_use]
    pub fn involves(&self, user: &UserId) -> bool {
        self.rider_id == *user || self.driver_id.as_ref() == Some(user)
    }
}
