//! HTTP 服务层
//!
//! 暴露前端使用的四个端点，并把请求分发给上游客户端和流翻译管道:
//! - `GET /` 静态入口页
//! - `GET /health` 存活探针
//! - `POST /chat` 一次性转发
//! - `POST /chat-stream` 流式转发

pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::RelayConfig;
use crate::relay::FlowClient;

/// 应用状态
///
/// 只含不可变配置和可克隆的上游客户端，请求之间没有共享可变状态
#[derive(Clone)]
pub struct AppState {
    /// 中继配置
    pub config: RelayConfig,
    /// Langflow 客户端
    pub client: FlowClient,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        let client = FlowClient::new(config.clone());
        Self { config, client }
    }
}

/// 组装路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/chat-stream", post(handlers::chat_stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 启动 HTTP 服务，直到进程结束
pub async fn run_server(config: RelayConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[SERVER] 监听 {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
