use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use foodgram_core::{CatalogStore, CoreError, Ingredient};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct IngredientSearchParams {
    /// Case-sensitive name prefix. Omit to list the whole catalog.
    pub name: Option<String>,
}

/// Returns the router for /api/ingredients endpoints (mounted at /api/ingredients)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ingredients))
        .route("/{id}", get(get_ingredient))
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(IngredientSearchParams),
    responses(
        (status = 200, description = "Matching ingredients ordered by name", body = Vec<IngredientResponse>)
    )
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(params): Query<IngredientSearchParams>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let prefix = params.name.unwrap_or_default();
    let ingredients = state
        .store
        .ingredients_by_prefix(&prefix)
        .map_err(CoreError::from)?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let ingredient = state
        .store
        .ingredient(id)
        .map_err(CoreError::from)?
        .ok_or(CoreError::NotFound("Ingredient not found"))?;
    Ok(Json(ingredient.into()))
}

#[derive(OpenApi)]
#[openapi(
    paths(list_ingredients, get_ingredient),
    components(schemas(IngredientResponse))
)]
pub struct ApiDoc;
