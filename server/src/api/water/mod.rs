pub mod additions;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/water endpoints (mounted at /api/water)
pub fn router() -> Router<AppState> {
    Router::new().route("/additions", post(additions::calculate))
}

#[derive(OpenApi)]
#[openapi(
    paths(additions::calculate),
    components(schemas(
        additions::WaterAdditionsRequest,
        additions::WaterAdditionsResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;

    fn request(batch_liters: f64) -> additions::WaterAdditionsRequest {
        serde_json::from_value(serde_json::json!({
            "source": {"ca": 10, "mg": 2, "na": 5, "cl": 10, "so4": 10, "hco3": 30},
            "target": {"ca": 100, "mg": 10, "na": 15, "cl": 50, "so4": 200, "hco3": 30},
            "batchLiters": batch_liters
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_additions_move_toward_target() {
        let response = additions::calculate(Ok(Json(request(20.0)))).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(!body["additions"].as_array().unwrap().is_empty());
        assert!(body["projected"]["so4"].as_f64().unwrap() > 10.0);
    }

    #[tokio::test]
    async fn test_non_positive_volume_rejected() {
        for litres in [0.0, -5.0] {
            let response = additions::calculate(Ok(Json(request(litres)))).await.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
