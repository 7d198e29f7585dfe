//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::api::dto::{CreateRideRequest, RateRideRequest, RideListResponse};
use crate::domain::{LedgerEntry, PaymentType, Ride, RideStatus};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::UserHistory;

/// Aggregated OpenAPI description of the service.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::rides::create_ride,
        crate::api::handlers::rides::list_open_rides,
        crate::api::handlers::rides::my_rides,
        crate::api::handlers::rides::claim_ride,
        crate::api::handlers::rides::complete_ride,
        crate::api::handlers::rides::rate_ride,
        crate::api::handlers::rides::cancel_ride,
        crate::api::handlers::history::get_history,
        crate::api::handlers::system::health_handler,
    ),
    components(schemas(
        Ride,
        RideStatus,
        PaymentType,
        LedgerEntry,
        UserHistory,
        CreateRideRequest,
        RateRideRequest,
        RideListResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Rides", description = "Ride lifecycle operations"),
        (name = "History", description = "Per-user derived views"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;
