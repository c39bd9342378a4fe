use super::AuthorResponse;
use crate::api::ErrorResponse;
use crate::auth::Viewer;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use foodgram_core::SubscriptionService;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSubscriptionsParams {
    /// Number of authors to return
    pub limit: Option<i64>,
    /// Number of authors to skip
    pub offset: Option<i64>,
    /// How many of each author's newest recipes to include
    pub recipes_limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(ListSubscriptionsParams),
    responses(
        (status = 200, description = "Followed authors ordered by username", body = Vec<AuthorResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_subscriptions(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Query(params): Query<ListSubscriptionsParams>,
) -> Result<Json<Vec<AuthorResponse>>, ApiError> {
    let authors = SubscriptionService::new(state.store.as_ref()).subscriptions(
        &viewer,
        params.limit,
        params.offset,
        params.recipes_limit,
    )?;
    Ok(Json(authors.into_iter().map(AuthorResponse::from).collect()))
}
