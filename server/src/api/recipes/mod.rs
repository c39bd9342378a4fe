pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod marks;
pub mod shopping_list;
pub mod short_link;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/download_shopping_cart",
            get(shopping_list::download_shopping_cart),
        )
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/favorite",
            axum::routing::post(marks::add_favorite).delete(marks::remove_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            axum::routing::post(marks::add_to_shopping_cart)
                .delete(marks::remove_from_shopping_cart),
        )
        .route("/{id}/get-link", get(short_link::get_link))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        marks::add_favorite,
        marks::remove_favorite,
        marks::add_to_shopping_cart,
        marks::remove_from_shopping_cart,
        shopping_list::download_shopping_cart,
        short_link::get_link,
        short_link::follow_short_link,
    ),
    components(schemas(
        create::RecipeRequest,
        create::IngredientAmountRequest,
        get::RecipeResponse,
        get::RecipeIngredientResponse,
        get::UserResponse,
        get::RecipeAuthorResponse,
        marks::RecipeSummaryResponse,
        short_link::ShortLinkResponse,
        list::ListRecipesResponse,
    ))
)]
pub struct ApiDoc;
