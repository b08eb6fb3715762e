pub mod health;
pub mod recipes;
pub mod water;

use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use brewgen_core::EngineError;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    pub message: String,
    /// Machine-readable error code
    pub error: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: code.to_string(),
        }
    }
}

pub fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::Authentication(_) => StatusCode::UNAUTHORIZED,
        EngineError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
        EngineError::Provider(_) | EngineError::MalformedOutput { .. } => StatusCode::BAD_GATEWAY,
        EngineError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        EngineError::LimitReached => StatusCode::FORBIDDEN,
        EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A body that could not be read as the endpoint's JSON type.
pub fn invalid_body(rejection: JsonRejection) -> Response {
    tracing::debug!(error = %rejection, "Rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("validation_error", rejection.body_text())),
    )
        .into_response()
}

/// Engine errors as HTTP responses.
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "Request failed");
        }
        let retry_after = match &self.0 {
            EngineError::RateLimit {
                retry_after: Some(after),
            } => HeaderValue::from_str(&after.as_secs().to_string()).ok(),
            _ => None,
        };

        let body = Json(ErrorResponse::new(self.0.code(), self.0.to_string()));
        let mut response = (status, body).into_response();
        if let Some(value) = retry_after {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

/// Every route, mounted at its full path.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/recipes", recipes::router())
        .nest("/api/water", water::router())
        .route("/api/health", get(health::health))
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "brewgen", description = "Brewing recipe generation API"),
        components(schemas(ErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        health::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        water::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use brewgen_core::llm::FakeProvider;
    use brewgen_core::{
        CompletionGateway, EngineConfig, InMemoryRecipeStore, ModelParameters, RecipeEngine,
        StoreError, UnlimitedGate, ValidationError,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        let engine = RecipeEngine::new(
            CompletionGateway::new(Arc::new(FakeProvider::default()), ModelParameters::default()),
            Arc::new(InMemoryRecipeStore::new()),
            Arc::new(UnlimitedGate),
            EngineConfig::default(),
        );
        router().with_state(Arc::new(engine))
    }

    async fn post_json(uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                EngineError::Validation(ValidationError::MissingBeerStyle),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::Authentication("bad key".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                EngineError::RateLimit { retry_after: None },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (EngineError::Provider("500".to_string()), StatusCode::BAD_GATEWAY),
            (
                EngineError::MalformedOutput {
                    reason: "eof".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                EngineError::Configuration("no key".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                EngineError::Timeout(Duration::from_secs(60)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (EngineError::LimitReached, StatusCode::FORBIDDEN),
            (
                EngineError::Store(StoreError::Backend("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{err}");
        }
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let response = ApiError(EngineError::RateLimit {
            retry_after: Some(Duration::from_secs(12)),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }

    #[test]
    fn test_openapi_has_all_paths() {
        let spec = openapi();
        for path in [
            "/api/recipes/generate",
            "/api/recipes",
            "/api/recipes/{owner_id}/{id}",
            "/api/water/additions",
            "/api/health",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn test_missing_user_id_is_validation_error() {
        let (status, body) = post_json(
            "/api/recipes/generate",
            r#"{"expertise": "beginner", "equipment": "pot", "beerStyle": "Pale Ale", "batchSize": 20}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_unreadable_bodies_use_error_envelope() {
        for (uri, raw) in [
            ("/api/recipes/generate", "{not json"),
            ("/api/recipes/generate", r#"{"userId": "alice", "batchSize": 20}"#),
            ("/api/recipes", r#"{"userId": "alice"}"#),
            ("/api/water/additions", r#"{"batchLiters": 20}"#),
        ] {
            let (status, body) = post_json(uri, raw).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {raw}");
            assert_eq!(body["success"], false, "{uri} {raw}");
            assert_eq!(body["error"], "validation_error", "{uri} {raw}");
            assert!(!body["message"].as_str().unwrap().is_empty());
        }
    }
}
