use super::create::RecipeRequest;
use super::get::RecipeResponse;
use crate::api::ErrorResponse;
use crate::auth::Viewer;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use foodgram_core::{RecipePayload, RecipeService};
use uuid::Uuid;

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let Json(request) = body?;
    let payload = RecipePayload::from(request);
    let view = RecipeService::new(state.store.as_ref()).update(&viewer, id, &payload)?;
    Ok(Json(view.into()))
}
