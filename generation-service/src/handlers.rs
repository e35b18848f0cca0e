//! Handler模块

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::AppError;
use common::models::query::{QueryRequest, QueryResponse};
use common::response::ApiResponse;

use crate::service::{GenerationService, SqlGenerator};
use crate::state::AppState;

/// 将自然语言问题转换为 SQL
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "generate",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "SQL 生成成功", body = ApiResponse<QueryResponse>),
        (status = 400, description = "问题为空"),
        (status = 404, description = "模型不存在"),
        (status = 429, description = "API 配额耗尽")
    )
)]
pub async fn generate_sql(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<ApiResponse<QueryResponse>>, AppError> {
    req.validate()?;

    let service = GenerationService::new(state.gemini.clone(), state.retry.clone());
    let data = service.generate(req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, "generation-service")))
}

/// 健康检查端点
///
/// 只报告存活状态与凭证配置情况，不触发外部调用。
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "generation-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        api_configured: state.settings.api_configured(),
        model: state.settings.model_name.clone(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// 是否配置了生成 API 凭证
    pub api_configured: bool,
    /// 当前配置的模型
    pub model: String,
}
