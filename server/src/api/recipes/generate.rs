use crate::api::{invalid_body, ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use brewgen_core::{RecipeRequest, SanitizedRecipe};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeRequest {
    /// Missing or empty ids are rejected as validation errors
    #[serde(default)]
    pub user_id: String,
    #[serde(flatten)]
    pub request: RecipeRequest,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeResponse {
    pub success: bool,
    pub recipe: SanitizedRecipe,
    /// Present when the recipe was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    /// The owner's plan does not allow saving more recipes
    pub limit_reached: bool,
}

#[utoipa::path(
    post,
    path = "/api/recipes/generate",
    tag = "recipes",
    request_body = GenerateRecipeRequest,
    responses(
        (status = 200, description = "Recipe generated", body = GenerateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Model credentials rejected", body = ErrorResponse),
        (status = 429, description = "Model rate limited", body = ErrorResponse),
        (status = 502, description = "Model failed or returned malformed output", body = ErrorResponse),
        (status = 503, description = "Model not configured", body = ErrorResponse),
        (status = 504, description = "Generation timed out", body = ErrorResponse)
    )
)]
pub async fn generate_recipe(
    State(engine): State<AppState>,
    payload: Result<Json<GenerateRecipeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection),
    };

    let outcome = match engine.generate(&body.user_id, &body.request).await {
        Ok(outcome) => outcome,
        Err(e) => return ApiError(e).into_response(),
    };

    let response = GenerateRecipeResponse {
        success: true,
        recipe_id: outcome.persistence.recipe_id().map(str::to_string),
        limit_reached: outcome.persistence.limit_reached(),
        recipe: outcome.recipe,
    };

    (StatusCode::OK, Json(response)).into_response()
}
