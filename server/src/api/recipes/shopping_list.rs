use crate::api::ErrorResponse;
use crate::auth::Viewer;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use foodgram_core::ShoppingListAggregator;

const FILENAME: &str = "shopping_list.txt";

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Plain-text shopping list, one line per ingredient and unit", content_type = "text/plain", body = String),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let report = ShoppingListAggregator::new(state.store.as_ref()).report(&viewer)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", FILENAME),
            ),
        ],
        report,
    )
        .into_response())
}
