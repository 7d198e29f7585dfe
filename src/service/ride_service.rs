//! Ride service: owns the lifecycle state machine and the ledger side-effect.
//!
//! Every mutation method follows the pattern: acquire the ride's transition
//! lock → fetch → validate against the current status → mutate → persist.
//! The per-ride lock is what turns the store's bare read-modify-write into
//! a serialized transition, closing the claim race window.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{LedgerEntry, Ride, RideDraft, RideId, RideLocks, RideStatus, UserId};
use crate::error::LedgerError;
use crate::identity::UserProfile;
use crate::store::KeyValueStore;

/// Orchestration layer for all ride operations.
///
/// Stateless apart from the external store and the in-process lock table;
/// safe to share behind an `Arc` across all request handlers.
#[derive(Debug)]
pub struct RideService {
    store: Arc<dyn KeyValueStore>,
    locks: RideLocks,
}

impl RideService {
    /// Creates a new `RideService` over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            locks: RideLocks::new(),
        }
    }

    /// Posts a new ride request for `rider` and returns it with status open.
    ///
    /// There is no shared mutable target yet, so creation never fails due
    /// to concurrent state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] if a required field is blank
    /// or the payment amount is negative or not a finite number, and
    /// [`LedgerError::Store`] on persistence failure.
    pub async fn create(&self, rider: &UserProfile, draft: RideDraft) -> Result<Ride, LedgerError> {
        validate_draft(&draft)?;

        let ride = Ride::new(rider, draft, Utc::now());
        self.persist_ride(&ride).await?;

        tracing::info!(ride_id = %ride.id, rider = %ride.rider_id, "ride created");
        Ok(ride)
    }

    /// Returns all open rides, newest first.
    ///
    /// Lock-free scan: a ride claimed a moment ago may still transiently
    /// appear for a racing reader, which is acceptable.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] on scan failure.
    pub async fn list_open(&self) -> Result<Vec<Ride>, LedgerError> {
        let mut rides: Vec<Ride> = self
            .scan_rides()
            .await?
            .into_iter()
            .filter(|ride| ride.status == RideStatus::Open)
            .collect();
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rides)
    }

    /// Returns every ride posted by `rider`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] on scan failure.
    pub async fn my_rides(&self, rider: &UserId) -> Result<Vec<Ride>, LedgerError> {
        let mut rides: Vec<Ride> = self
            .scan_rides()
            .await?
            .into_iter()
            .filter(|ride| ride.rider_id == *rider)
            .collect();
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rides)
    }

    /// Claims an open ride for `driver`: the race-critical transition.
    ///
    /// Of all concurrent claims on one ride, exactly one caller commits the
    /// open → claimed transition and, when the ride promises a positive
    /// amount, records exactly one ledger entry. The ride record is written
    /// before the ledger entry; a crash between the two leaves a claimed
    /// ride with no recorded promise, never a duplicated or orphaned entry.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RideNotFound`] if the ride is absent,
    /// [`LedgerError::InvalidState`] if it is no longer open (including
    /// every claim race loser), [`LedgerError::Forbidden`] on self-claim,
    /// [`LedgerError::Store`] on persistence failure.
    pub async fn claim(&self, ride_id: &RideId, driver: &UserProfile) -> Result<Ride, LedgerError> {
        let lock = self.locks.acquire(ride_id).await;
        let _transition = lock.lock().await;

        let mut ride = self.fetch_ride(ride_id).await?;
        if ride.status != RideStatus::Open {
            return Err(LedgerError::InvalidState(format!(
                "ride {ride_id} is {}",
                ride.status
            )));
        }
        if ride.rider_id == driver.id {
            return Err(LedgerError::Forbidden(
                "you cannot claim your own ride request".to_string(),
            ));
        }

        let claimed_at = Utc::now();
        ride.status = RideStatus::Claimed;
        ride.driver_id = Some(driver.id.clone());
        ride.driver_name = Some(driver.name.clone());
        ride.claimed_at = Some(claimed_at);
        self.persist_ride(&ride).await?;

        if ride.payment_amount > 0.0 {
            let entry = LedgerEntry::from_claim(&ride, driver, claimed_at);
            if let Err(err) = self.persist_entry(&entry).await {
                // The claim itself committed; surface the failure instead
                // of retrying, which could record the promise twice.
                tracing::warn!(
                    ride_id = %ride.id,
                    entry_id = %entry.id,
                    error = %err,
                    "ride claimed but promise record failed"
                );
                return Err(err);
            }
        }

        tracing::info!(ride_id = %ride.id, driver = %driver.id, "ride claimed");
        Ok(ride)
    }

    /// Marks a claimed ride completed. Rider or driver may call this.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RideNotFound`] if absent, [`LedgerError::InvalidState`]
    /// unless the ride is claimed, [`LedgerError::Forbidden`] for callers
    /// who are neither rider nor driver, [`LedgerError::Store`] on
    /// persistence failure.
    pub async fn complete(&self, ride_id: &RideId, caller: &UserId) -> Result<Ride, LedgerError> {
        let lock = self.locks.acquire(ride_id).await;
        let _transition = lock.lock().await;

        let mut ride = self.fetch_ride(ride_id).await?;
        if ride.status != RideStatus::Claimed {
            return Err(LedgerError::InvalidState(format!(
                "ride {ride_id} is {}",
                ride.status
            )));
        }
        if !ride.involves(caller) {
            return Err(LedgerError::Forbidden(
                "only the rider or the driver can complete this ride".to_string(),
            ));
        }

        ride.status = RideStatus::Completed;
        ride.completed_at = Some(Utc::now());
        self.persist_ride(&ride).await?;
        self.locks.discard(ride_id).await;

        tracing::info!(ride_id = %ride.id, caller = %caller, "ride completed");
        Ok(ride)
    }

    /// Records that a completed ride was rated. Rider or driver may call
    /// this, once; no aggregate score is kept.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RideNotFound`] if absent, [`LedgerError::InvalidState`]
    /// unless the ride is completed and not yet rated,
    /// [`LedgerError::Forbidden`] for third parties,
    /// [`LedgerError::InvalidRequest`] for ratings outside 1–5,
    /// [`LedgerError::Store`] on persistence failure.
    pub async fn rate(
        &self,
        ride_id: &RideId,
        caller: &UserId,
        rating: u8,
    ) -> Result<Ride, LedgerError> {
        let lock = self.locks.acquire(ride_id).await;
        let _transition = lock.lock().await;

        let mut ride = self.fetch_ride(ride_id).await?;
        if ride.status != RideStatus::Completed {
            return Err(LedgerError::InvalidState(format!(
                "ride {ride_id} is {}",
                ride.status
            )));
        }
        if ride.rated {
            return Err(LedgerError::InvalidState(format!(
                "ride {ride_id} is already rated"
            )));
        }
        if !ride.involves(caller) {
            return Err(LedgerError::Forbidden(
                "only the rider or the driver can rate this ride".to_string(),
            ));
        }
        if !(1..=5).contains(&rating) {
            return Err(LedgerError::InvalidRequest(
                "rating must be between 1 and 5".to_string(),
            ));
        }

        ride.rated = true;
        self.persist_ride(&ride).await?;
        self.locks.discard(ride_id).await;

        tracing::info!(ride_id = %ride.id, caller = %caller, rating, "ride rated");
        Ok(ride)
    }

    /// Cancels an open ride. Only the requesting rider may call this.
    ///
    /// No ledger side-effect and no race hazard of its own: the only
    /// competing writer is the claim path, and both run under the same
    /// per-ride lock.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RideNotFound`] if absent, [`LedgerError::InvalidState`]
    /// unless the ride is open, [`LedgerError::Forbidden`] for callers other
    /// than the rider, [`LedgerError::Store`] on persistence failure.
    pub async fn cancel(&self, ride_id: &RideId, caller: &UserId) -> Result<Ride, LedgerError> {
        let lock = self.locks.acquire(ride_id).await;
        let _transition = lock.lock().await;

        let mut ride = self.fetch_ride(ride_id).await?;
        if ride.status != RideStatus::Open {
            return Err(LedgerError::InvalidState(format!(
                "ride {ride_id} is {}",
                ride.status
            )));
        }
        if ride.rider_id != *caller {
            return Err(LedgerError::Forbidden(
                "only the requesting rider can cancel this ride".to_string(),
            ));
        }

        ride.status = RideStatus::Cancelled;
        self.persist_ride(&ride).await?;
        self.locks.discard(ride_id).await;

        tracing::info!(ride_id = %ride.id, "ride cancelled");
        Ok(ride)
    }

    async fn fetch_ride(&self, ride_id: &RideId) -> Result<Ride, LedgerError> {
        let value = self
            .store
            .get(ride_id.as_str())
            .await?
            .ok_or_else(|| LedgerError::RideNotFound(ride_id.clone()))?;
        serde_json::from_value(value)
            .map_err(|e| LedgerError::Internal(format!("corrupt ride record {ride_id}: {e}")))
    }

    async fn scan_rides(&self) -> Result<Vec<Ride>, LedgerError> {
        let values = self.store.get_by_prefix(RideId::PREFIX).await?;
        // Records that no longer decode are skipped rather than failing the
        // whole listing.
        Ok(values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect())
    }

    async fn persist_ride(&self, ride: &Ride) -> Result<(), LedgerError> {
        let value = serde_json::to_value(ride)
            .map_err(|e| LedgerError::Internal(format!("serialize ride {}: {e}", ride.id)))?;
        self.store.set(ride.id.as_str(), value).await
    }

    async fn persist_entry(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let value = serde_json::to_value(entry)
            .map_err(|e| LedgerError::Internal(format!("serialize entry {}: {e}", entry.id)))?;
        self.store.set(entry.id.as_str(), value).await
    }
}

fn validate_draft(draft: &RideDraft) -> Result<(), LedgerError> {
    for (field, value) in [
        ("pickup_location", &draft.pickup_location),
        ("dropoff_location", &draft.dropoff_location),
        ("date", &draft.date),
        ("time", &draft.time),
    ] {
        if value.trim().is_empty() {
            return Err(LedgerError::InvalidRequest(format!("{field} is required")));
        }
    }
    if let Some(amount) = draft.payment_amount
        && (!amount.is_finite() || amount < 0.0)
    {
        return Err(LedgerError::InvalidRequest(
            "payment_amount must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}
