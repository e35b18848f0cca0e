//! 生成服务 HTTP 客户端

use common::models::query::{QueryRequest, QueryResponse};
use common::response::ApiResponse;
use thiserror::Error;

/// 客户端侧错误分类
#[derive(Debug, Error)]
pub enum ClientError {
    /// 服务端返回 429（配额耗尽）
    #[error("{0}")]
    RateLimited(String),

    /// 其他非 2xx 响应
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// 网络层错误（超时、连接失败等）
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// 响应格式不符合预期
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// 生成服务客户端
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// 创建新的客户端实例
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// 健康检查，返回服务是否可达
    pub async fn health(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// 提交生成请求
    pub async fn generate(&self, req: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let url = format!("{}/api/generate", self.base_url);
        tracing::debug!(url = %url, database = %req.database_type, "提交生成请求");
        let response = self.http.post(&url).json(req).send().await?;

        let status = response.status();
        if status.is_success() {
            let envelope: ApiResponse<QueryResponse> = response.json().await?;
            return envelope
                .data
                .ok_or_else(|| ClientError::InvalidResponse("missing data field".to_string()));
        }

        // 失败时尽量取信封里的错误消息
        let message = response
            .json::<ApiResponse<QueryResponse>>()
            .await
            .ok()
            .and_then(|envelope| envelope.error)
            .map(|error| error.message)
            .unwrap_or_else(|| format!("HTTP {}", status));

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Err(ClientError::RateLimited(message))
        } else {
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::DatabaseType;

    fn request() -> QueryRequest {
        QueryRequest {
            question: "list users".to_string(),
            schema: None,
            database_type: DatabaseType::PostgreSQL,
        }
    }

    #[tokio::test]
    async fn test_generate_unwraps_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "success": true,
                    "data": {
                        "sql_query": "SELECT * FROM users;",
                        "question": "list users",
                        "database_type": "PostgreSQL",
                        "success": true
                    },
                    "meta": { "timestamp": "2026-01-01T00:00:00Z", "service": "generation-service" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let resp = client.generate(&request()).await.unwrap();

        assert_eq!(resp.sql_query, "SELECT * FROM users;");
        assert!(resp.success);
    }

    #[tokio::test]
    async fn test_429_maps_to_rate_limited_with_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "success": false,
                    "error": { "code": "QUOTA_EXCEEDED", "message": "API quota exceeded. Please try again later." },
                    "meta": { "timestamp": "2026-01-01T00:00:00Z" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.generate(&request()).await.unwrap_err();

        match err {
            ClientError::RateLimited(message) => assert!(message.contains("quota")),
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_health_reflects_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body(r#"{"status": "healthy"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        assert!(client.health().await);
    }
}
