//! Caller identity extraction for authorized endpoints.
//!
//! [`AuthUser`] pulls the bearer credential off the `Authorization` header
//! and hands it to the configured [`crate::identity::IdentityResolver`].
//! Handlers declare their auth requirement by taking the extractor as an
//! argument; unauthorized requests never reach the handler body.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::error::LedgerError;
use crate::identity::UserProfile;

/// The resolved profile of the authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(
    /// Profile the credential resolved to.
    pub UserProfile,
);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = LedgerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(LedgerError::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        let profile = state.identity.resolve(token).await?;
        Ok(Self(profile))
    }
}
