use axum::Json;
use utils::response::ApiResponse;

pub async fn health_check() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("OK"))
}
