//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::identity::IdentityResolver;
use crate::service::{HistoryService, RideService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ride service for all lifecycle mutations and listings.
    pub ride_service: Arc<RideService>,
    /// Read-only history aggregation.
    pub history_service: Arc<HistoryService>,
    /// Bearer credential resolution seam.
    pub identity: Arc<dyn IdentityResolver>,
}
