//! Type-safe record identifiers and the storage key scheme.
//!
//! Ride and ledger-entry identifiers double as storage keys: a [`RideId`]
//! is the literal `ride:<millis>:<rider>` key the record lives under, so
//! prefix scans over [`RideId::PREFIX`] enumerate all rides. [`UserId`] is
//! the opaque stable identifier issued by the external identity provider.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque stable identifier for a member, owned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps an identifier string issued by the identity provider.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a ride request.
///
/// Derived once at creation time from the creation timestamp and the
/// requesting rider, never reused. The identifier is also the storage key,
/// so all rides are reachable through a scan over [`RideId::PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RideId(String);

impl RideId {
    /// Storage key prefix shared by every ride record.
    pub const PREFIX: &'static str = "ride:";

    /// Derives the identifier for a ride created at `created_at` by `rider`.
    #[must_use]
    pub fn generate(created_at: DateTime<Utc>, rider: &UserId) -> Self {
        Self(format!(
            "{}{}:{}",
            Self::PREFIX,
            created_at.timestamp_millis(),
            rider
        ))
    }

    /// Wraps an identifier received from a client path parameter.
    #[must_use]
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the identifier (and storage key) as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ledger entry.
///
/// Derived from the claim timestamp and the claiming driver, mirroring the
/// ride key scheme under its own [`EntryId::PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Storage key prefix shared by every ledger entry.
    pub const PREFIX: &'static str = "transaction:";

    /// Derives the identifier for an entry recorded at `claimed_at` for `driver`.
    #[must_use]
    pub fn generate(claimed_at: DateTime<Utc>, driver: &UserId) -> Self {
        Self(format!(
            "{}{}:{}",
            Self::PREFIX,
            claimed_at.timestamp_millis(),
            driver
        ))
    }

    /// Returns the identifier (and storage key) as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
