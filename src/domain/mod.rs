//! Domain layer: record identity, the ride state machine, ledger entries,
//! and the per-ride lock table.
//!
//! This module contains the service-side domain model: deterministic
//! string identifiers that double as storage keys, the [`Ride`] aggregate
//! with its lifecycle statuses, the immutable [`LedgerEntry`] payment
//! promise, and [`RideLocks`] for serializing state transitions.

pub mod ids;
pub mod ledger;
pub mod ride;
pub mod ride_locks;

pub use ids::{EntryId, RideId, UserId};
pub use ledger::LedgerEntry;
pub use ride::{PaymentType, Ride, RideDraft, RideStatus};
pub use ride_locks::RideLocks;
