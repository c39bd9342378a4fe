use super::AuthorResponse;
use crate::api::ErrorResponse;
use crate::auth::Viewer;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use foodgram_core::SubscriptionService;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubscribeParams {
    /// How many of the author's newest recipes to include
    pub recipes_limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Author's user ID"),
        SubscribeParams
    ),
    responses(
        (status = 201, description = "Subscribed", body = AuthorResponse),
        (status = 400, description = "Already subscribed or self-subscription", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subscribe(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SubscribeParams>,
) -> Result<(StatusCode, Json<AuthorResponse>), ApiError> {
    let summary =
        SubscriptionService::new(state.store.as_ref()).subscribe(&viewer, id, params.recipes_limit)?;
    Ok((StatusCode::CREATED, Json(summary.into())))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Author's user ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User or subscription not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unsubscribe(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    SubscriptionService::new(state.store.as_ref()).unsubscribe(&viewer, id)?;
    Ok(StatusCode::NO_CONTENT)
}
