pub mod generate;
pub mod get;
pub mod save;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(save::save_recipe))
        .route("/generate", post(generate::generate_recipe))
        .route("/{owner_id}/{id}", get(get::get_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        generate::generate_recipe,
        save::save_recipe,
        get::get_recipe,
    ),
    components(schemas(
        generate::GenerateRecipeRequest,
        generate::GenerateRecipeResponse,
        save::SaveRecipeRequest,
        save::SaveRecipeResponse,
        brewgen_core::StoredRecipe,
    ))
)]
pub struct ApiDoc;
