use super::get::RecipeResponse;
use crate::api::ErrorResponse;
use crate::auth::Viewer;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use foodgram_core::{IngredientAmountInput, RecipePayload, RecipeService};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientAmountRequest {
    pub id: i32,
    pub amount: i64,
}

/// Body for both create and update. Missing fields fail validation with a
/// specific message instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RecipeRequest {
    pub name: String,
    pub text: String,
    /// Image reference or encoded image. Optional on update, where the
    /// current image is kept.
    pub image: Option<String>,
    pub cooking_time: i64,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
}

impl From<RecipeRequest> for RecipePayload {
    fn from(request: RecipeRequest) -> Self {
        RecipePayload {
            name: request.name,
            text: request.text,
            image: request.image,
            cooking_time: request.cooking_time,
            tags: request.tags,
            ingredients: request.ingredients.map(|lines| {
                lines
                    .into_iter()
                    .map(|line| IngredientAmountInput {
                        id: line.id,
                        amount: line.amount,
                    })
                    .collect()
            }),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    body: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let Json(request) = body?;
    let payload = RecipePayload::from(request);
    let view = RecipeService::new(state.store.as_ref()).create(&viewer, &payload)?;
    Ok((StatusCode::CREATED, Json(view.into())))
}
