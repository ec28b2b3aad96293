//! 中继错误类型
//!
//! 定义请求处理过程中可能发生的错误及其 HTTP 映射。
//! 线上错误载荷是扁平的 `{"error": "..."}`，Display 文本直接上线，
//! 所以各变体的错误消息保持英文。
//!
//! 单行流事件解析失败不在此列: 那是唯一被完全恢复的错误，
//! 解析器告警后跳过该行。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// 中继错误
#[derive(Error, Debug, Clone)]
pub enum RelayError {
    /// 令牌未配置或仍是占位符
    #[error("{0}")]
    Config(String),

    /// 入站请求不合法
    #[error("{0}")]
    Validation(String),

    /// 上游返回非成功状态码
    #[error("API returned status code {status}: {body}")]
    Upstream { status: u16, body: String },

    /// 网络层面未到达上游
    #[error("API request failed: {0}")]
    Transport(String),
}

impl RelayError {
    /// 令牌缺失或占位符未替换
    pub fn token_not_configured() -> Self {
        Self::Config("Please set your application token in the LANGFLOW_TOKEN variable".to_string())
    }

    /// 从上游响应状态构造错误
    pub fn from_upstream_status(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// 从 reqwest 错误构造传输错误
    pub fn from_reqwest_error(e: &reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }

    /// 获取对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Config(_) => 500,
            RelayError::Validation(_) => 400,
            RelayError::Upstream { .. } => 500,
            RelayError::Transport(_) => 500,
        }
    }

    /// 获取错误类型字符串（用于结构化日志）
    pub fn error_type(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "config_error",
            RelayError::Validation(_) => "validation_error",
            RelayError::Upstream { .. } => "upstream_error",
            RelayError::Transport(_) => "transport_error",
        }
    }

    /// 转换为线上错误载荷
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
