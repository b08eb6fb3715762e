use crate::api::{invalid_body, ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use brewgen_core::{Recipe, RecipeRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecipeRequest {
    #[serde(default)]
    pub user_id: String,
    /// The request the recipe was generated for
    pub request: RecipeRequest,
    pub recipe: Recipe,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecipeResponse {
    pub success: bool,
    pub recipe_id: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = SaveRecipeRequest,
    responses(
        (status = 201, description = "Recipe saved", body = SaveRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Recipe limit reached", body = ErrorResponse)
    )
)]
pub async fn save_recipe(
    State(engine): State<AppState>,
    payload: Result<Json<SaveRecipeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection),
    };

    let output = match engine.normalize(&body.request, body.recipe) {
        Ok(output) => output,
        Err(e) => return ApiError(e).into_response(),
    };

    match engine.save_recipe(&body.user_id, &output.recipe).await {
        Ok(recipe_id) => (
            StatusCode::CREATED,
            Json(SaveRecipeResponse {
                success: true,
                recipe_id,
            }),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
