//! Langflow 上游客户端
//!
//! 负责构造并发起对 Langflow API 的出站调用。
//! 一次性与流式两种模式共用同一套 URL、载荷和鉴权构造，
//! 流式模式只多一个 `Accept: text/event-stream` 头，
//! 并在拿到状态行之后把响应交给流翻译管道增量读取。
//!
//! 失败不重试，单次失败立即上抛。

use reqwest::Client;
use tracing::{debug, error, info};

use crate::config::RelayConfig;
use crate::error::RelayError;

/// 一次 flow 调用的参数
///
/// `endpoint` 进 URL 路径，其余字段构成上游请求体
#[derive(Debug, Clone)]
pub struct FlowRunRequest {
    /// 用户消息，透传为上游的 input_value
    pub input_value: String,
    /// 目标 flow ID，缺省时使用配置里的默认 flow
    pub endpoint: Option<String>,
    /// 输出类型
    pub output_type: String,
    /// 输入类型
    pub input_type: String,
}

impl FlowRunRequest {
    /// 以默认的 chat 输入输出类型构造请求
    pub fn new(input_value: impl Into<String>) -> Self {
        Self {
            input_value: input_value.into(),
            endpoint: None,
            output_type: "chat".to_string(),
            input_type: "chat".to_string(),
        }
    }
}

/// Langflow API 客户端
///
/// 持有不可变配置和带超时配置的连接池。克隆成本低，
/// 每个请求任务各拿一份，互相之间没有共享可变状态。
#[derive(Clone)]
pub struct FlowClient {
    config: RelayConfig,
    client: Client,
}

impl FlowClient {
    pub fn new(config: RelayConfig) -> Self {
        // 显式超时配置，避免流式传输被中途掐断
        // 整体超时只加在一次性调用上，流式读取由管道的空闲超时兜底
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30)) // 连接超时 30 秒
            .pool_idle_timeout(std::time::Duration::from_secs(90)) // 连接池空闲超时
            .tcp_keepalive(std::time::Duration::from_secs(60)) // TCP keep-alive
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// 客户端当前使用的配置
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// 构建 flow 执行地址
    fn build_url(&self, endpoint: &str) -> String {
        let base = self.config.base_api_url.trim_end_matches('/');
        format!(
            "{}/lf/{}/api/v1/run/{}",
            base, self.config.namespace_id, endpoint
        )
    }

    /// 解析目标 flow，请求未指定或为空时退回默认值
    fn resolve_endpoint<'a>(&'a self, request: &'a FlowRunRequest) -> &'a str {
        request
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.config.default_flow_id)
    }

    /// 构建上游请求体
    ///
    /// `endpoint` 不进请求体，只进 URL
    fn build_payload(&self, request: &FlowRunRequest) -> serde_json::Value {
        serde_json::json!({
            "input_value": request.input_value,
            "output_type": request.output_type,
            "input_type": request.input_type,
        })
    }

    /// 一次性调用: 等完整响应，返回上游的 JSON 体
    pub async fn run_flow(&self, request: &FlowRunRequest) -> Result<serde_json::Value, RelayError> {
        self.config.ensure_token()?;

        let endpoint = self.resolve_endpoint(request);
        let url = self.build_url(endpoint);
        let payload = self.build_payload(request);

        info!("[FLOW_API] 发送请求: url={} flow={}", url, endpoint);
        debug!("[FLOW_API] Token length: {}", self.config.token.len());
        debug!("[FLOW_API] Payload: {}", payload);

        let resp = self
            .client
            .post(&url)
            .timeout(std::time::Duration::from_secs(300)) // 一次性调用整体超时 5 分钟
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::from_reqwest_error(&e))?;

        let status = resp.status();
        debug!("[FLOW_API] 响应状态: status={}", status);

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                "[FLOW_API] 请求失败: {} - {}",
                status,
                safe_truncate(&body, 200)
            );
            return Err(RelayError::from_upstream_status(status.as_u16(), body));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RelayError::from_reqwest_error(&e))?;
        debug!(
            "[FLOW_API] 响应内容: {}...",
            safe_truncate(&data.to_string(), 100)
        );

        Ok(data)
    }

    /// 流式调用: 只等到状态行，响应体留给调用方增量读取
    ///
    /// 非成功状态在读取任何响应体之前就被识别并上抛
    pub async fn run_flow_stream(
        &self,
        request: &FlowRunRequest,
    ) -> Result<reqwest::Response, RelayError> {
        self.config.ensure_token()?;

        let endpoint = self.resolve_endpoint(request);
        let url = self.build_url(endpoint);
        let payload = self.build_payload(request);

        info!("[FLOW_STREAM] 发起流式请求: url={} flow={}", url, endpoint);

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("Accept", "text/event-stream")
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::from_reqwest_error(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                "[FLOW_STREAM] 请求失败: {} - {}",
                status,
                safe_truncate(&body, 200)
            );
            return Err(RelayError::from_upstream_status(status.as_u16(), body));
        }

        info!("[FLOW_STREAM] 流式响应开始: status={}", status);
        Ok(resp)
    }
}

/// 安全截断字符串到指定字符数，避免 UTF-8 边界问题
fn safe_truncate(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_chars {
        s.to_string()
    } else {
        chars[..max_chars].iter().collect()
    }
}
