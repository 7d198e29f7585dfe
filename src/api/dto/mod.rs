//! Request and response body types for the REST API.

pub mod ride_dto;

pub use ride_dto::{CreateRideRequest, RateRideRequest, RideListResponse};
