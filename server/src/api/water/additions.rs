use crate::api::{invalid_body, ErrorResponse};
use axum::{
    extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json,
};
use brewgen_core::water::{calculate_additions, project_profile, MineralProfile, WaterAddition};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaterAdditionsRequest {
    pub source: MineralProfile,
    pub target: MineralProfile,
    /// Volume of brewing liquor in litres
    pub batch_liters: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaterAdditionsResponse {
    pub additions: Vec<WaterAddition>,
    /// Source profile after the additions
    pub projected: MineralProfile,
}

#[utoipa::path(
    post,
    path = "/api/water/additions",
    tag = "water",
    request_body = WaterAdditionsRequest,
    responses(
        (status = 200, description = "Proposed salt and acid additions", body = WaterAdditionsResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn calculate(payload: Result<Json<WaterAdditionsRequest>, JsonRejection>) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection),
    };

    if !(request.batch_liters.is_finite() && request.batch_liters > 0.0) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "validation_error",
                "Batch volume must be a positive number of litres",
            )),
        )
            .into_response();
    }
    if !request.source.is_valid() || !request.target.is_valid() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "validation_error",
                "Mineral values must be non-negative numbers",
            )),
        )
            .into_response();
    }

    let additions = calculate_additions(&request.source, &request.target, request.batch_liters);
    let projected = project_profile(&request.source, &additions, request.batch_liters);

    (
        StatusCode::OK,
        Json(WaterAdditionsResponse {
            additions,
            projected,
        }),
    )
        .into_response()
}
