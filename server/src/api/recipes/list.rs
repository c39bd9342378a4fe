use super::get::RecipeResponse;
use crate::api::ErrorResponse;
use crate::auth::Viewer;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use foodgram_core::{RecipeFilter, RecipeService};
use serde::Serialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRecipesParams {
    /// Only recipes by this author
    pub author: Option<Uuid>,
    /// Tag slug; repeat the parameter to match any of several tags
    pub tags: Vec<String>,
    /// 1 for the caller's favorites, 0 for everything else. Ignored when anonymous.
    pub is_favorited: Option<bool>,
    /// 1 for recipes in the caller's cart, 0 for everything else. Ignored when anonymous.
    pub is_in_shopping_cart: Option<bool>,
    /// Page size (default: 6, max: 100)
    pub limit: Option<i64>,
    /// Number of recipes to skip (default: 0)
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    /// Recipes matching the filters across all pages
    pub count: i64,
    pub results: Vec<RecipeResponse>,
}

fn parse_flag(key: &str, value: &str) -> Result<bool, String> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(format!("{} must be 0 or 1", key)),
    }
}

fn parse_number(key: &str, value: &str) -> Result<i64, String> {
    value
        .parse()
        .map_err(|_| format!("{} must be an integer", key))
}

/// Parses raw query pairs. Unknown keys are ignored; `tags` may repeat.
fn parse_params(pairs: Vec<(String, String)>) -> Result<ListRecipesParams, String> {
    let mut params = ListRecipesParams::default();

    for (key, value) in pairs {
        match key.as_str() {
            "author" => {
                let id = value
                    .parse()
                    .map_err(|_| "author must be a user id".to_string())?;
                params.author = Some(id);
            }
            "tags" => {
                if !value.is_empty() {
                    params.tags.push(value);
                }
            }
            "is_favorited" => params.is_favorited = Some(parse_flag(&key, &value)?),
            "is_in_shopping_cart" => {
                params.is_in_shopping_cart = Some(parse_flag(&key, &value)?)
            }
            "limit" => params.limit = Some(parse_number(&key, &value)?),
            "offset" => params.offset = Some(parse_number(&key, &value)?),
            _ => {}
        }
    }

    Ok(params)
}

impl From<ListRecipesParams> for RecipeFilter {
    fn from(params: ListRecipesParams) -> Self {
        RecipeFilter {
            author: params.author,
            tags: params.tags,
            is_favorited: params.is_favorited,
            is_in_shopping_cart: params.is_in_shopping_cart,
            limit: params.limit,
            offset: params.offset,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Recipes, newest first", body = ListRecipesResponse),
        (status = 400, description = "Malformed query parameter", body = ErrorResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListRecipesResponse>, ApiError> {
    let filter: RecipeFilter = parse_params(pairs).map_err(ApiError::BadRequest)?.into();
    let service = RecipeService::new(state.store.as_ref());
    let count = service.count(&viewer, &filter)?;
    let recipes = service.list(&viewer, &filter)?;

    Ok(Json(ListRecipesResponse {
        count,
        results: recipes.into_iter().map(RecipeResponse::from).collect(),
    }))
}
