//! Ride lifecycle handlers: post, list, claim, complete, rate, cancel.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::AuthUser;
use crate::api::dto::{CreateRideRequest, RateRideRequest, RideListResponse};
use crate::app_state::AppState;
use crate::domain::{Ride, RideId};
use crate::error::{ErrorResponse, LedgerError};

/// `POST /rides` — Post a new ride request.
///
/// # Errors
///
/// Returns [`LedgerError`] on missing fields or an invalid payment amount.
#[utoipa::path(
    post,
    path = "/api/v1/rides",
    tag = "Rides",
    summary = "Post a ride request",
    description = "Creates an open ride request with the caller's contact info snapshotted onto it.",
    request_body = CreateRideRequest,
    responses(
        (status = 201, description = "Ride created", body = Ride),
        (status = 400, description = "Missing field or invalid amount", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn create_ride(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateRideRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let ride = state.ride_service.create(&user, req.into_draft()).await?;
    Ok((StatusCode::CREATED, Json(ride)))
}

/// `GET /rides` — List all open rides, newest first. No auth required.
///
/// # Errors
///
/// Returns [`LedgerError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/rides",
    tag = "Rides",
    summary = "List open rides",
    description = "Returns every ride still waiting for a driver, most recent first.",
    responses(
        (status = 200, description = "Open rides", body = RideListResponse),
    )
)]
pub async fn list_open_rides(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, LedgerError> {
    let rides = state.ride_service.list_open().await?;
    Ok(Json(RideListResponse { rides }))
}

/// `GET /rides/mine` — List the caller's own posted rides.
///
/// # Errors
///
/// Returns [`LedgerError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/rides/mine",
    tag = "Rides",
    summary = "List the caller's posted rides",
    description = "Returns every ride the caller posted, most recent first, for review and cancellation.",
    responses(
        (status = 200, description = "The caller's rides", body = RideListResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn my_rides(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, LedgerError> {
    let rides = state.ride_service.my_rides(&user.id).await?;
    Ok(Json(RideListResponse { rides }))
}

/// `POST /rides/{id}/claim` — Claim an open ride as driver.
///
/// # Errors
///
/// Returns [`LedgerError`] if the ride is absent, no longer open, or the
/// caller posted it themselves.
#[utoipa::path(
    post,
    path = "/api/v1/rides/{id}/claim",
    tag = "Rides",
    summary = "Claim an open ride",
    description = "Commits the caller as driver. Of concurrent claims on one ride exactly one succeeds; a positive payment amount records a ledger entry.",
    params(
        ("id" = String, Path, description = "Ride identifier"),
    ),
    responses(
        (status = 200, description = "Ride claimed", body = Ride),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller posted this ride", body = ErrorResponse),
        (status = 404, description = "Ride not found", body = ErrorResponse),
        (status = 409, description = "Ride is no longer available", body = ErrorResponse),
    )
)]
pub async fn claim_ride(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    let ride = state
        .ride_service
        .claim(&RideId::from_key(id), &user)
        .await?;
    Ok(Json(ride))
}

/// `POST /rides/{id}/complete` — Mark a claimed ride completed.
///
/// # Errors
///
/// Returns [`LedgerError`] if the ride is absent, not claimed, or the
/// caller is neither rider nor driver.
#[utoipa::path(
    post,
    path = "/api/v1/rides/{id}/complete",
    tag = "Rides",
    summary = "Complete a claimed ride",
    description = "Rider or driver marks the ride as done, opening it up for rating.",
    params(
        ("id" = String, Path, description = "Ride identifier"),
    ),
    responses(
        (status = 200, description = "Ride completed", body = Ride),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller is neither rider nor driver", body = ErrorResponse),
        (status = 404, description = "Ride not found", body = ErrorResponse),
        (status = 409, description = "Ride is not claimed", body = ErrorResponse),
    )
)]
pub async fn complete_ride(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    let ride = state
        .ride_service
        .complete(&RideId::from_key(id), &user.id)
        .await?;
    Ok(Json(ride))
}

/// `POST /rides/{id}/rate` — Record that a completed ride was rated.
///
/// # Errors
///
/// Returns [`LedgerError`] if the ride is absent, not completed, already
/// rated, the caller is a third party, or the rating is out of range.
#[utoipa::path(
    post,
    path = "/api/v1/rides/{id}/rate",
    tag = "Rides",
    summary = "Rate a completed ride",
    description = "Rider or driver records a 1–5 rating, once per ride. No aggregate score is kept.",
    params(
        ("id" = String, Path, description = "Ride identifier"),
    ),
    request_body = RateRideRequest,
    responses(
        (status = 204, description = "Rating recorded"),
        (status = 400, description = "Rating out of range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller is neither rider nor driver", body = ErrorResponse),
        (status = 404, description = "Ride not found", body = ErrorResponse),
        (status = 409, description = "Ride is not completed or already rated", body = ErrorResponse),
    )
)]
pub async fn rate_ride(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RateRideRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    state
        .ride_service
        .rate(&RideId::from_key(id), &user.id, req.rating)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /rides/{id}/cancel` — Withdraw an open ride.
///
/// # Errors
///
/// Returns [`LedgerError`] if the ride is absent, no longer open, or the
/// caller is not the rider who posted it.
#[utoipa::path(
    post,
    path = "/api/v1/rides/{id}/cancel",
    tag = "Rides",
    summary = "Cancel an open ride",
    description = "The posting rider withdraws a ride nobody has claimed yet.",
    params(
        ("id" = String, Path, description = "Ride identifier"),
    ),
    responses(
        (status = 200, description = "Ride cancelled", body = Ride),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Caller did not post this ride", body = ErrorResponse),
        (status = 404, description = "Ride not found", body = ErrorResponse),
        (status = 409, description = "Ride is no longer open", body = ErrorResponse),
    )
)]
pub async fn cancel_ride(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    let ride = state
        .ride_service
        .cancel(&RideId::from_key(id), &user.id)
        .await?;
    Ok(Json(ride))
}

/// Ride lifecycle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rides", post(create_ride).get(list_open_rides))
        .route("/rides/mine", get(my_rides))
        .route("/rides/{id}/claim", post(claim_ride))
        .route("/rides/{id}/complete", post(complete_ride))
        .route("/rides/{id}/rate", post(rate_ride))
        .route("/rides/{id}/cancel", post(cancel_ride))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::api;
    use crate::domain::UserId;
    use crate::identity::{StaticTokenResolver, UserProfile};
    use crate::service::{HistoryService, RideService};
    use crate::store::{KeyValueStore, MemoryStore};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn profile(id: &str, name: &str) -> UserProfile {
        UserProfile {
            id: UserId::from(id),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            college_email: format!("{id}@college.edu"),
        }
    }

    fn make_app() -> (Router, Arc<StaticTokenResolver>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let resolver = Arc::new(StaticTokenResolver::new());
        let state = AppState {
            ride_service: Arc::new(RideService::new(Arc::clone(&store))),
            history_service: Arc::new(HistoryService::new(store)),
            identity: Arc::clone(&resolver) as Arc<dyn crate::identity::IdentityResolver>,
        };
        (api::build_router().with_state(state), resolver)
    }

    fn post_json(uri: &str, token: &str, body: &str) -> Request<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body.to_string()));
        let Ok(request) = request else {
            panic!("request build failed");
        };
        request
    }

    fn post_empty(uri: &str, token: &str) -> Request<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty());
        let Ok(request) = request else {
            panic!("request build failed");
        };
        request
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let Ok(request) = builder.body(Body::empty()) else {
            panic!("request build failed");
        };
        request
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await;
        let Ok(bytes) = bytes else {
            panic!("body read failed");
        };
        let value = serde_json::from_slice(&bytes).ok();
        let Some(value) = value else {
            panic!("body is not JSON");
        };
        value
    }

    const CREATE_BODY: &str = r#"{
        "pickup_location": "Library",
        "dropoff_location": "Airport",
        "date": "2026-08-07",
        "time": "14:30",
        "payment_type": "meal-swipes",
        "payment_amount": 2
    }"#;

    #[tokio::test]
    async fn create_without_credential_is_unauthorized() {
        let (app, _) = make_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/rides")
            .header("content-type", "application/json")
            .body(Body::from(CREATE_BODY));
        let Ok(request) = request else {
            panic!("request build failed");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_open_requires_no_credential() {
        let (app, _) = make_app();
        let Ok(response) = app.oneshot(get_request("/api/v1/rides", None)).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["rides"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn full_lifecycle_over_http() {
        let (app, resolver) = make_app();
        let rider_token = resolver.issue(profile("a", "Ada")).await;
        let driver_token = resolver.issue(profile("b", "Ben")).await;
        let third_token = resolver.issue(profile("c", "Cy")).await;

        // Post.
        let Ok(response) = app
            .clone()
            .oneshot(post_json("/api/v1/rides", &rider_token, CREATE_BODY))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::CREATED);
        let ride = body_json(response).await;
        assert_eq!(ride["status"], "open");
        let Some(ride_id) = ride["id"].as_str().map(str::to_string) else {
            panic!("missing ride id");
        };

        // Self-claim is forbidden.
        let uri = format!("/api/v1/rides/{ride_id}/claim");
        let Ok(response) = app.clone().oneshot(post_empty(&uri, &rider_token)).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Driver claims.
        let Ok(response) = app.clone().oneshot(post_empty(&uri, &driver_token)).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let claimed = body_json(response).await;
        assert_eq!(claimed["status"], "claimed");
        assert_eq!(claimed["driver_id"], "b");

        // A second claim races and loses.
        let Ok(response) = app.clone().oneshot(post_empty(&uri, &third_token)).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Complete.
        let uri = format!("/api/v1/rides/{ride_id}/complete");
        let Ok(response) = app.clone().oneshot(post_empty(&uri, &driver_token)).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);

        // Rate once, then again.
        let uri = format!("/api/v1/rides/{ride_id}/rate");
        let Ok(response) = app
            .clone()
            .oneshot(post_json(&uri, &rider_token, r#"{"rating": 5}"#))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let Ok(response) = app
            .clone()
            .oneshot(post_json(&uri, &rider_token, r#"{"rating": 4}"#))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // The claimed ride no longer shows in the open listing.
        let Ok(response) = app.oneshot(get_request("/api/v1/rides", None)).await else {
            panic!("request failed");
        };
        let body = body_json(response).await;
        assert_eq!(body["rides"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn rate_out_of_range_is_bad_request() {
        let (app, resolver) = make_app();
        let rider_token = resolver.issue(profile("a", "Ada")).await;
        let driver_token = resolver.issue(profile("b", "Ben")).await;

        let Ok(response) = app
            .clone()
            .oneshot(post_json("/api/v1/rides", &rider_token, CREATE_BODY))
            .await
        else {
            panic!("request failed");
        };
        let ride = body_json(response).await;
        let Some(ride_id) = ride["id"].as_str().map(str::to_string) else {
            panic!("missing ride id");
        };

        let Ok(_) = app
            .clone()
            .oneshot(post_empty(&format!("/api/v1/rides/{ride_id}/claim"), &driver_token))
            .await
        else {
            panic!("request failed");
        };
        let Ok(_) = app
            .clone()
            .oneshot(post_empty(&format!("/api/v1/rides/{ride_id}/complete"), &driver_token))
            .await
        else {
            panic!("request failed");
        };

        let Ok(response) = app
            .oneshot(post_json(
                &format!("/api/v1/rides/{ride_id}/rate"),
                &rider_token,
                r#"{"rating": 9}"#,
            ))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancel_rejects_other_users() {
        let (app, resolver) = make_app();
        let rider_token = resolver.issue(profile("a", "Ada")).await;
        let other_token = resolver.issue(profile("b", "Ben")).await;

        let Ok(response) = app
            .clone()
            .oneshot(post_json("/api/v1/rides", &rider_token, CREATE_BODY))
            .await
        else {
            panic!("request failed");
        };
        let ride = body_json(response).await;
        let Some(ride_id) = ride["id"].as_str().map(str::to_string) else {
            panic!("missing ride id");
        };

        let uri = format!("/api/v1/rides/{ride_id}/cancel");
        let Ok(response) = app.clone().oneshot(post_empty(&uri, &other_token)).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let Ok(response) = app.oneshot(post_empty(&uri, &rider_token)).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let cancelled = body_json(response).await;
        assert_eq!(cancelled["status"], "cancelled");
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let (app, resolver) = make_app();
        let token = resolver.issue(profile("a", "Ada")).await;
        // dropoff_location omitted entirely
        let body = r#"{
            "pickup_location": "Library",
            "date": "2026-08-07",
            "time": "14:30"
        }"#;
        let Ok(response) = app.oneshot(post_json("/api/v1/rides", &token, body)).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
