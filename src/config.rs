//! 中继配置
//!
//! 启动时从环境变量读取一次，之后不可变。
//! 配置以构造参数传入各组件，不经由全局可变状态。

use std::env;

use anyhow::Context;

use crate::error::RelayError;

/// 默认上游基础地址
const DEFAULT_BASE_API_URL: &str = "https://api.langflow.astra.datastax.com";

/// 默认监听端口
const DEFAULT_PORT: u16 = 5000;

/// 中继配置
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Langflow API 基础地址
    pub base_api_url: String,
    /// Langflow 工作区 ID，拼进上游路径的 `/lf/{namespace}` 段
    pub namespace_id: String,
    /// 默认 flow ID，请求未指定 endpoint 时使用
    pub default_flow_id: String,
    /// Bearer 令牌，允许为空（服务照常启动但拒绝转发请求）
    pub token: String,
    /// 监听端口
    pub port: u16,
}

impl RelayConfig {
    /// 从环境变量加载配置
    ///
    /// `LANGFLOW_NAMESPACE_ID` 和 `LANGFLOW_FLOW_ID` 缺失时启动失败；
    /// `LANGFLOW_TOKEN` 缺失不阻止启动，转发请求会逐个被拒绝
    pub fn from_env() -> anyhow::Result<Self> {
        let base_api_url =
            env::var("LANGFLOW_API_URL").unwrap_or_else(|_| DEFAULT_BASE_API_URL.to_string());
        let namespace_id =
            env::var("LANGFLOW_NAMESPACE_ID").context("LANGFLOW_NAMESPACE_ID is not set")?;
        let default_flow_id =
            env::var("LANGFLOW_FLOW_ID").context("LANGFLOW_FLOW_ID is not set")?;
        let token = env::var("LANGFLOW_TOKEN").unwrap_or_default();
        let port = env::var("FLOWCAST_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            base_api_url,
            namespace_id,
            default_flow_id,
            token,
            port,
        })
    }

    /// 校验令牌是否已正确配置
    ///
    /// 空白令牌和含 `<`/`>` 占位符的令牌都视为未配置
    pub fn validate_token(&self) -> bool {
        if self.token.trim().is_empty() {
            return false;
        }
        if self.token.contains('<') || self.token.contains('>') {
            return false;
        }
        true
    }

    /// 逐请求的防御性令牌检查
    pub fn ensure_token(&self) -> Result<(), RelayError> {
        if self.validate_token() {
            Ok(())
        } else {
            Err(RelayError::token_not_configured())
        }
    }

    /// 监听地址
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
