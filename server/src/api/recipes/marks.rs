use crate::api::ErrorResponse;
use crate::auth::Viewer;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use foodgram_core::{MarkKind, MembershipService, RecipeSummary};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Compact recipe card returned by favorite, cart and subscription endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<RecipeSummary> for RecipeSummaryResponse {
    fn from(summary: RecipeSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            image: summary.image,
            cooking_time: summary.cooking_time,
        }
    }
}

fn add_mark(
    kind: MarkKind,
    viewer: Viewer,
    state: AppState,
    id: Uuid,
) -> Result<(StatusCode, Json<RecipeSummaryResponse>), ApiError> {
    let summary = MembershipService::new(state.store.as_ref()).add(kind, &viewer.0, id)?;
    Ok((StatusCode::CREATED, Json(summary.into())))
}

fn remove_mark(
    kind: MarkKind,
    viewer: Viewer,
    state: AppState,
    id: Uuid,
) -> Result<StatusCode, ApiError> {
    MembershipService::new(state.store.as_ref()).remove(kind, &viewer.0, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to favorites", body = RecipeSummaryResponse),
        (status = 400, description = "Already in favorites", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_favorite(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<RecipeSummaryResponse>), ApiError> {
    add_mark(MarkKind::Favorite, viewer, state, id)
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 400, description = "Not in favorites", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_favorite(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    remove_mark(MarkKind::Favorite, viewer, state, id)
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to shopping cart", body = RecipeSummaryResponse),
        (status = 400, description = "Already in shopping cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_to_shopping_cart(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<RecipeSummaryResponse>), ApiError> {
    add_mark(MarkKind::ShoppingCart, viewer, state, id)
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from shopping cart"),
        (status = 400, description = "Not in shopping cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_from_shopping_cart(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    remove_mark(MarkKind::ShoppingCart, viewer, state, id)
}
