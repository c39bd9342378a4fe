pub mod subscribe;
pub mod subscriptions;

use crate::api::recipes::get::UserResponse;
use crate::api::recipes::marks::RecipeSummaryResponse;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use foodgram_core::AuthorSummary;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// A followed author with a preview of their newest recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: i64,
}

impl From<AuthorSummary> for AuthorResponse {
    fn from(summary: AuthorSummary) -> Self {
        Self {
            user: summary.user.into(),
            is_subscribed: summary.is_subscribed,
            recipes: summary
                .recipes
                .into_iter()
                .map(RecipeSummaryResponse::from)
                .collect(),
            recipes_count: summary.recipes_count,
        }
    }
}

/// Returns the router for /api/users endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(AuthorResponse))
)]
pub struct ApiDoc;
