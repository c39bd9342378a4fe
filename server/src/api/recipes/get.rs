use crate::api::tags::TagResponse;
use crate::api::ErrorResponse;
use crate::auth::Viewer;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use foodgram_core::{RecipeIngredientView, RecipeService, RecipeView, User};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Recipe author as seen by the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeAuthorResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Always false for anonymous callers.
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredientView> for RecipeIngredientResponse {
    fn from(line: RecipeIngredientView) -> Self {
        Self {
            id: line.id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe as seen by one viewer. The viewer flags are always false for
/// anonymous callers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub author: RecipeAuthorResponse,
    pub name: String,
    pub image: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub cooking_time: i32,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl From<RecipeView> for RecipeResponse {
    fn from(view: RecipeView) -> Self {
        Self {
            id: view.id,
            author: RecipeAuthorResponse {
                user: view.author.into(),
                is_subscribed: view.author_subscribed,
            },
            name: view.name,
            image: view.image,
            text: view.text,
            pub_date: view.pub_date,
            cooking_time: view.cooking_time,
            tags: view.tags.into_iter().map(TagResponse::from).collect(),
            ingredients: view
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited: view.is_favorited,
            is_in_shopping_cart: view.is_in_shopping_cart,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_recipe(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let view = RecipeService::new(state.store.as_ref()).get(&viewer, id)?;
    Ok(Json(view.into()))
}
