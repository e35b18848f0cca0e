//! SQL 生成服务模块

use std::sync::Arc;

use async_trait::async_trait;

use common::errors::{AppError, AppResult};
use common::models::query::{QueryRequest, QueryResponse};
use common::utils::SqlCleaner;

use crate::gemini::{GeminiClient, GeminiError};
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::retry::RetryPolicy;

/// SQL 生成服务 Trait
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// 将自然语言问题转换为 SQL
    async fn generate(&self, req: QueryRequest) -> AppResult<QueryResponse>;
}

/// 自然语言转 SQL 生成服务
pub struct GenerationService {
    gemini: Arc<GeminiClient>,
    retry: RetryPolicy,
}

impl GenerationService {
    /// 创建新的生成服务实例
    pub fn new(gemini: Arc<GeminiClient>, retry: RetryPolicy) -> Self {
        Self { gemini, retry }
    }
}

#[async_trait]
impl SqlGenerator for GenerationService {
    async fn generate(&self, req: QueryRequest) -> AppResult<QueryResponse> {
        // 空白问题直接拒绝，不触发外部调用
        let question = req.question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("Question is required".to_string()));
        }

        // 空白 schema 视为缺省
        let schema = req.schema.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let prompt = build_prompt(question, schema);

        // 仅对配额耗尽类错误重试，其余错误立即上抛
        let raw = self
            .retry
            .run(
                || self.gemini.generate(SYSTEM_PROMPT, &prompt),
                GeminiError::is_resource_exhausted,
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "生成失败");
                map_generation_error(self.gemini.model_name(), e)
            })?;

        let sql_query = SqlCleaner::clean(&raw);
        tracing::info!(question = %truncate(question, 50), "SQL 已生成");

        Ok(QueryResponse {
            sql_query,
            question: question.to_string(),
            database_type: req.database_type,
            success: true,
        })
    }
}

/// 将生成 API 的类型化错误映射为对外错误
fn map_generation_error(model: &str, err: GeminiError) -> AppError {
    match err {
        GeminiError::ResourceExhausted { .. } => {
            AppError::QuotaExceeded("API quota exceeded. Please try again later.".to_string())
        }
        GeminiError::NotFound { .. } => {
            AppError::ModelNotFound(format!("Model {} not found.", model))
        }
        other => AppError::ExternalService(other.to_string()),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::GeminiSettings;
    use common::models::DatabaseType;
    use std::time::Duration;

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn test_settings() -> GeminiSettings {
        GeminiSettings {
            api_key: "test-key".to_string(),
            model_name: "gemini-2.5-flash".to_string(),
            temperature: 0.2,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 4096,
        }
    }

    fn service_for(server: &mockito::Server) -> GenerationService {
        let gemini = GeminiClient::new(&test_settings()).with_base_url(server.url());
        // 测试用极短退避，避免拖慢用例
        let retry = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5));
        GenerationService::new(Arc::new(gemini), retry)
    }

    fn request(question: &str, schema: Option<&str>) -> QueryRequest {
        QueryRequest {
            question: question.to_string(),
            schema: schema.map(String::from),
            database_type: DatabaseType::PostgreSQL,
        }
    }

    fn candidates_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] }
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_blank_question_rejected_without_api_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .expect(0)
            .create_async()
            .await;

        let service = service_for(&server);
        let err = service.generate(request("   ", None)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generated_sql_is_cleaned_and_echoed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidates_body("```sql\nSELECT region, SUM(sales)\nFROM sales_data\nGROUP BY region;\n```"))
            .expect(1)
            .create_async()
            .await;

        let service = service_for(&server);
        let resp = service
            .generate(request("  show total sales by region  ", None))
            .await
            .unwrap();

        assert!(resp.success);
        assert_eq!(
            resp.sql_query,
            "SELECT region, SUM(sales)\nFROM sales_data\nGROUP BY region;"
        );
        assert_eq!(resp.question, "show total sales by region");
        assert_eq!(resp.database_type, DatabaseType::PostgreSQL);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_quota_errors_exhaust_retries_then_surface_429_class() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(429)
            .with_body(r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#)
            .expect(3)
            .create_async()
            .await;

        let service = service_for(&server);
        let err = service.generate(request("list users", None)).await.unwrap_err();

        assert!(matches!(err, AppError::QuotaExceeded(_)));
        // 重试上限为 3 次，外部 API 恰好被调用 3 次
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_model_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(404)
            .with_body(r#"{"error": {"code": 404, "message": "Model not found", "status": "NOT_FOUND"}}"#)
            .expect(1)
            .create_async()
            .await;

        let service = service_for(&server);
        let err = service.generate(request("list users", None)).await.unwrap_err();

        match err {
            AppError::ModelNotFound(message) => {
                assert!(message.contains("gemini-2.5-flash"));
            }
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blank_schema_treated_as_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"contents": [{"parts": [{"text": "Convert to SQL: list users"}]}]}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidates_body("SELECT * FROM users;"))
            .create_async()
            .await;

        let service = service_for(&server);
        let resp = service
            .generate(request("list users", Some("   ")))
            .await
            .unwrap();

        assert_eq!(resp.sql_query, "SELECT * FROM users;");
    }
}
