use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use brewgen_core::StoredRecipe;

#[utoipa::path(
    get,
    path = "/api/recipes/{owner_id}/{id}",
    tag = "recipes",
    params(
        ("owner_id" = String, Path, description = "Owner ID"),
        ("id" = String, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Saved recipe", body = StoredRecipe),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(engine): State<AppState>,
    Path((owner_id, id)): Path<(String, String)>,
) -> impl IntoResponse {
    match engine.load_recipe(&owner_id, &id).await {
        Ok(Some(recipe)) => (StatusCode::OK, Json(recipe)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("not_found", "Recipe not found")),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
