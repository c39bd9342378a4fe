use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use foodgram_core::ShortLinkService;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// Origin for absolute links: the configured public URL, else the Host header.
fn base_url(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = configured {
        return base.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Stable short link for the recipe", body = ShortLinkResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 503, description = "No free token could be issued", body = ErrorResponse)
    )
)]
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ShortLinkResponse>, ApiError> {
    let token = ShortLinkService::new(state.store.as_ref()).get_or_create(id)?;
    let base = base_url(state.config.public_base_url.as_deref(), &headers);

    Ok(Json(ShortLinkResponse {
        short_link: format!("{}/s/{}", base, token),
    }))
}

#[utoipa::path(
    get,
    path = "/s/{token}",
    tag = "recipes",
    params(
        ("token" = String, Path, description = "Short-link token")
    ),
    responses(
        (status = 302, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    )
)]
pub async fn follow_short_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let recipe_id = ShortLinkService::new(state.store.as_ref()).resolve(&token)?;
    let location = format!("/recipes/{}", recipe_id);

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
