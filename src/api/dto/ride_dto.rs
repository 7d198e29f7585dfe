//! Ride-related request and response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{PaymentType, Ride, RideDraft};

/// Request body for `POST /rides`.
///
/// Absent fields deserialize to their defaults so that a missing required
/// field surfaces as the service's own validation error rather than a
/// body-decoding rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRideRequest {
    /// Free-text pickup location.
    #[serde(default)]
    pub pickup_location: String,
    /// Free-text dropoff location.
    #[serde(default)]
    pub dropoff_location: String,
    /// Calendar date, stored as provided.
    #[serde(default)]
    pub date: String,
    /// Time of day, stored as provided.
    #[serde(default)]
    pub time: String,
    /// Kind of payment promised. Defaults to meal swipes when omitted.
    #[serde(default = "default_payment_type")]
    pub payment_type: PaymentType,
    /// Promised amount. Omitted means 0.
    #[serde(default)]
    pub payment_amount: Option<f64>,
}

fn default_payment_type() -> PaymentType {
    PaymentType::MealSwipes
}

impl CreateRideRequest {
    /// Converts the request into the service-layer draft.
    #[must_use]
    pub fn into_draft(self) -> RideDraft {
        RideDraft {
            pickup_location: self.pickup_location,
            dropoff_location: self.dropoff_location,
            date: self.date,
            time: self.time,
            payment_type: self.payment_type,
            payment_amount: self.payment_amount,
        }
    }
}

/// Response body for ride list endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct RideListResponse {
    /// Matching rides, newest first.
    pub rides: Vec<Ride>,
}

/// Request body for `POST /rides/{id}/rate`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RateRideRequest {
    /// Rating value, 1–5 inclusive.
    pub rating: u8,
}
