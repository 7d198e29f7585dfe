//! History aggregation: per-user derived views over rides and the ledger.
//!
//! Purely read-only. Safe to call arbitrarily often and concurrently with
//! writers; a transition committed mid-scan may or may not appear, which is
//! acceptable eventual consistency.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EntryId, LedgerEntry, Ride, RideId, UserId};
use crate::error::LedgerError;
use crate::store::KeyValueStore;

/// The four derived views for one user, each sorted newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserHistory {
    /// Rides the user posted as rider.
    pub rides_requested: Vec<Ride>,
    /// Rides the user fulfilled as driver.
    pub rides_provided: Vec<Ride>,
    /// Promises the user owes (they were the rider).
    pub owed: Vec<LedgerEntry>,
    /// Promises owed to the user (they were the driver).
    pub earned: Vec<LedgerEntry>,
}

/// Read-only aggregator over the ride and ledger record sets.
#[derive(Debug)]
pub struct HistoryService {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryService {
    /// Creates a new `HistoryService` over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Computes the four views for `user`. A user with no activity gets
    /// four empty sequences, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] on scan failure.
    pub async fn history(&self, user: &UserId) -> Result<UserHistory, LedgerError> {
        let rides: Vec<Ride> = self
            .store
            .get_by_prefix(RideId::PREFIX)
            .await?
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        let mut rides_requested: Vec<Ride> = Vec::new();
        let mut rides_provided: Vec<Ride> = Vec::new();
        for ride in rides {
            if ride.rider_id == *user {
                rides_requested.push(ride);
            } else if ride.driver_id.as_ref() == Some(user) {
                rides_provided.push(ride);
            }
        }
        rides_requested.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rides_provided.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let entries: Vec<LedgerEntry> = self
            .store
            .get_by_prefix(EntryId::PREFIX)
            .await?
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        let mut owed: Vec<LedgerEntry> = Vec::new();
        let mut earned: Vec<LedgerEntry> = Vec::new();
        for entry in entries {
            if entry.rider_id == *user {
                owed.push(entry);
            } else if entry.driver_id == *user {
                earned.push(entry);
            }
        }
        owed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        earned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(UserHistory {
            rides_requested,
            rides_provided,
            owed,
            earned,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{PaymentType, RideDraft};
    use crate::identity::UserProfile;
    use crate::service::RideService;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn profile(id: &str, name: &str) -> UserProfile {
        UserProfile {
            id: UserId::from(id),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            college_email: format!("{id}@college.edu"),
        }
    }

    fn draft(amount: Option<f64>) -> RideDraft {
        RideDraft {
            pickup_location: "Library".to_string(),
            dropoff_location: "Airport".to_string(),
            date: "2026-08-07".to_string(),
            time: "14:30".to_string(),
            payment_type: PaymentType::MealSwipes,
            payment_amount: amount,
        }
    }

    fn make_services() -> (RideService, HistoryService) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        (
            RideService::new(Arc::clone(&store)),
            HistoryService::new(store),
        )
    }

    #[tokio::test]
    async fn inactive_user_gets_four_empty_views() {
        let (_, history) = make_services();
        let result = history.history(&UserId::from("nobody")).await;
        let Ok(views) = result else {
            panic!("history failed");
        };
        assert!(views.rides_requested.is_empty());
        assert!(views.rides_provided.is_empty());
        assert!(views.owed.is_empty());
        assert!(views.earned.is_empty());
    }

    #[tokio::test]
    async fn views_partition_by_role() {
        let (rides, history) = make_services();
        let ada = profile("a", "Ada");
        let ben = profile("b", "Ben");

        let Ok(paid) = rides.create(&ada, draft(Some(2.0))).await else {
            panic!("create failed");
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let Ok(_open) = rides.create(&ada, draft(Some(1.0))).await else {
            panic!("create failed");
        };
        let Ok(_) = rides.claim(&paid.id, &ben).await else {
            panic!("claim failed");
        };

        let Ok(ada_views) = history.history(&ada.id).await else {
            panic!("history failed");
        };
        assert_eq!(ada_views.rides_requested.len(), 2);
        assert!(ada_views.rides_provided.is_empty());
        assert_eq!(ada_views.owed.len(), 1);
        assert!(ada_views.earned.is_empty());

        let Ok(ben_views) = history.history(&ben.id).await else {
            panic!("history failed");
        };
        assert!(ben_views.rides_requested.is_empty());
        assert_eq!(ben_views.rides_provided.len(), 1);
        assert!(ben_views.owed.is_empty());
        assert_eq!(ben_views.earned.len(), 1);
        assert_eq!(
            ben_views.earned.first().map(|e| e.ride_id.clone()),
            Some(paid.id)
        );
    }

    #[tokio::test]
    async fn requested_rides_sort_newest_first() {
        let (rides, history) = make_services();
        let ada = profile("a", "Ada");

        let Ok(older) = rides.create(&ada, draft(None)).await else {
            panic!("create failed");
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let Ok(newer) = rides.create(&ada, draft(None)).await else {
            panic!("create failed");
        };

        let Ok(views) = history.history(&ada.id).await else {
            panic!("history failed");
        };
        let ids: Vec<_> = views.rides_requested.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
