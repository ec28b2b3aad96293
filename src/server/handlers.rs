//! HTTP 端点处理器
//!
//! 校验、令牌检查这类能在提交响应框架之前发现的错误，
//! 直接以 JSON 错误响应返回；流式端点一旦进入 event-stream
//! 框架，后续失败一律转成流内错误事件。

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::RelayError;
use crate::relay::FlowRunRequest;
use crate::server::AppState;
use crate::stream::{translate_byte_stream, RelayEvent, STREAM_IDLE_TIMEOUT};

fn default_io_type() -> String {
    "chat".to_string()
}

/// 入站聊天请求
///
/// 未知字段被忽略，与前端的宽松约定保持一致
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// 用户消息，必填且非空
    #[serde(default)]
    pub message: Option<String>,
    /// 目标 flow，缺省使用配置的默认 flow
    #[serde(default)]
    pub endpoint: Option<String>,
    /// 输出类型
    #[serde(default = "default_io_type")]
    pub output_type: String,
    /// 输入类型
    #[serde(default = "default_io_type")]
    pub input_type: String,
}

impl ChatRequest {
    /// 校验请求并转换为上游调用参数
    ///
    /// 缺失和空字符串的 message 同样处理
    fn into_flow_request(self) -> Result<FlowRunRequest, RelayError> {
        let message = self
            .message
            .filter(|m| !m.is_empty())
            .ok_or_else(|| RelayError::Validation("Message is required".to_string()))?;

        Ok(FlowRunRequest {
            input_value: message,
            endpoint: self.endpoint,
            output_type: self.output_type,
            input_type: self.input_type,
        })
    }
}

/// GET / 静态入口页
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// GET /health 存活探针，无条件 200
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// POST /chat 一次性转发
///
/// 成功时把上游 JSON 体原样包进 `{"response": ...}`
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    debug!("[CHAT] 收到请求: id={}", request_id);

    match handle_chat(&state, payload).await {
        Ok(response) => {
            debug!("[CHAT] 请求完成: id={}", request_id);
            (
                StatusCode::OK,
                Json(serde_json::json!({ "response": response })),
            )
                .into_response()
        }
        Err(e) => {
            error!(
                "[CHAT] 请求处理失败: id={} type={} message={}",
                request_id,
                e.error_type(),
                e
            );
            e.into_response()
        }
    }
}

async fn handle_chat(
    state: &AppState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<serde_json::Value, RelayError> {
    state.config.ensure_token()?;

    let Json(request) =
        payload.map_err(|_| RelayError::Validation("Invalid JSON".to_string()))?;
    debug!("[CHAT] Request data: {:?}", request);

    let flow_request = request.into_flow_request()?;
    state.client.run_flow(&flow_request).await
}

/// POST /chat-stream 流式转发
///
/// 上游连接在响应体生成器内部建立，连接失败和读取失败
/// 都以流内 `{"error"}` 事件加终止 `{"complete"}` 事件收尾。
/// 客户端断开时 axum 丢弃响应体流，生成器连同上游连接一起释放。
pub async fn chat_stream(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    debug!("[CHAT_STREAM] 收到请求: id={}", request_id);

    if let Err(e) = state.config.ensure_token() {
        error!(
            "[CHAT_STREAM] 请求被拒绝: id={} type={}",
            request_id,
            e.error_type()
        );
        return e.into_response();
    }

    let request = match payload {
        Ok(Json(request)) => request,
        Err(_) => {
            let e = RelayError::Validation("Invalid JSON".to_string());
            error!(
                "[CHAT_STREAM] 请求被拒绝: id={} type={}",
                request_id,
                e.error_type()
            );
            return e.into_response();
        }
    };

    let flow_request = match request.into_flow_request() {
        Ok(flow_request) => flow_request,
        Err(e) => {
            error!(
                "[CHAT_STREAM] 请求被拒绝: id={} type={}",
                request_id,
                e.error_type()
            );
            return e.into_response();
        }
    };

    let client = state.client.clone();
    let event_stream = async_stream::stream! {
        // 连接在这里建立: 从此刻起的失败都走流内错误路径，
        // HTTP 状态已经定格为 200
        let response = match client.run_flow_stream(&flow_request).await {
            Ok(response) => response,
            Err(e) => {
                error!("[CHAT_STREAM] 上游调用失败: id={} {}", request_id, e);
                yield RelayEvent::error(e.to_string());
                yield RelayEvent::completed("");
                return;
            }
        };

        let translated = translate_byte_stream(response.bytes_stream(), STREAM_IDLE_TIMEOUT);
        let mut translated = std::pin::pin!(translated);
        while let Some(event) = translated.next().await {
            yield event;
        }
        info!("[CHAT_STREAM] 流结束: id={}", request_id);
    };

    let body_stream = event_stream.map(|event| -> Result<axum::body::Bytes, std::io::Error> {
        Ok(axum::body::Bytes::from(event.to_wire()))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(body_stream))
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to build streaming response" })),
            )
                .into_response()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request.message.as_deref(), Some("hi"));
        assert_eq!(request.endpoint, None);
        assert_eq!(request.output_type, "chat");
        assert_eq!(request.input_type, "chat");
    }

    #[test]
    fn test_chat_request_overrides() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"message":"hi","endpoint":"flow-x","output_type":"text","input_type":"text"}"#,
        )
        .unwrap();
        assert_eq!(request.endpoint.as_deref(), Some("flow-x"));
        assert_eq!(request.output_type, "text");
        assert_eq!(request.input_type, "text");
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","session_id":"abc"}"#).unwrap();
        assert_eq!(request.message.as_deref(), Some("hi"));
    }

    #[test]
    fn test_missing_message_rejected() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        let err = request.into_flow_request().unwrap_err();
        assert_eq!(err.to_string(), "Message is required");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_empty_message_rejected() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":""}"#).unwrap();
        let err = request.into_flow_request().unwrap_err();
        assert_eq!(err.to_string(), "Message is required");
    }

    #[test]
    fn test_valid_message_converted() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message":"hello","endpoint":"flow-x"}"#).unwrap();
        let flow_request = request.into_flow_request().unwrap();
        assert_eq!(flow_request.input_value, "hello");
        assert_eq!(flow_request.endpoint.as_deref(), Some("flow-x"));
        assert_eq!(flow_request.output_type, "chat");
    }
}
