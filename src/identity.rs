//! Identity resolution seam.
//!
//! Authentication is delegated entirely to an external collaborator: this
//! crate never parses or validates credentials itself, it only consumes a
//! resolved [`UserProfile`] or fails with `Unauthorized`. Deployments plug
//! their own [`IdentityResolver`] implementation into the app state; the
//! bundled [`StaticTokenResolver`] backs development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::UserId;
use crate::error::LedgerError;

/// Projected member profile, owned by the identity provider.
///
/// Read-only from this crate's perspective; ride and ledger records
/// snapshot these fields rather than referencing them live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// College email address.
    pub college_email: String,
}

/// Resolves a bearer credential to a member profile.
#[async_trait]
pub trait IdentityResolver: Send + Sync + std::fmt::Debug {
    /// Resolves `bearer` to the profile it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unauthorized`] if the credential is unknown
    /// or the upstream provider rejects it.
    async fn resolve(&self, bearer: &str) -> Result<UserProfile, LedgerError>;
}

/// In-memory token → profile map for development and tests.
#[derive(Debug, Default)]
pub struct StaticTokenResolver {
    tokens: RwLock<HashMap<String, UserProfile>>,
}

impl StaticTokenResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a fresh bearer token for `profile` and returns it.
    pub async fn issue(&self, profile: UserProfile) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone(), profile);
        token
    }

    /// Registers a fixed token for `profile`.
    pub async fn register(&self, token: impl Into<String>, profile: UserProfile) {
        self.tokens.write().await.insert(token.into(), profile);
    }
}

#[async_trait]
impl IdentityResolver for StaticTokenResolver {
    async fn resolve(&self, bearer: &str) -> Result<UserProfile, LedgerError> {
        self.tokens
            .read()
            .await
            .get(bearer)
            .cloned()
            .ok_or(LedgerError::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            id: UserId::from(id),
            name: "Ada".to_string(),
            phone: "555-0100".to_string(),
            college_email: "ada@college.edu".to_string(),
        }
    }

    #[tokio::test]
    async fn issued_token_resolves_to_profile() {
        let resolver = StaticTokenResolver::new();
        let token = resolver.issue(profile("rider-1")).await;

        let resolved = resolver.resolve(&token).await;
        let Ok(resolved) = resolved else {
            panic!("expected profile");
        };
        assert_eq!(resolved.id, UserId::from("rider-1"));
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let resolver = StaticTokenResolver::new();
        let result = resolver.resolve("nope").await;
        assert!(matches!(result, Err(LedgerError::Unauthorized)));
    }

    #[tokio::test]
    async fn registered_token_resolves() {
        let resolver = StaticTokenResolver::new();
        resolver.register("fixed-token", profile("rider-2")).await;

        let resolved = resolver.resolve("fixed-token").await;
        let Ok(resolved) = resolved else {
            panic!("expected profile");
        };
        assert_eq!(resolved.id, UserId::from("rider-2"));
    }
}
