//! Service layer: ride lifecycle orchestration and history aggregation.

pub mod history_service;
pub mod ride_service;

pub use history_service::{HistoryService, UserHistory};
pub use ride_service::RideService;
