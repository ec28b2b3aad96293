//! flowcast: Langflow 聊天中继后端
//!
//! 一个薄中继: 静态前端把聊天消息发到本服务，本服务持有
//! Bearer 令牌向 Langflow API 转发，并把流式响应翻译成
//! 归一化事件流回传给浏览器。令牌始终留在服务端。
//!
//! # 模块结构
//!
//! - `config`: 环境变量配置与令牌校验
//! - `error`: 错误类型与 HTTP 映射
//! - `relay`: Langflow 上游客户端（一次性 / 流式）
//! - `stream`: 流翻译层（行解析、片段提取、事件管道）
//! - `server`: HTTP 服务层（路由与端点处理器）

pub mod config;
pub mod error;
pub mod relay;
pub mod server;
pub mod stream;

pub use config::RelayConfig;
pub use error::RelayError;
pub use relay::{FlowClient, FlowRunRequest};
pub use server::{create_router, run_server, AppState};
pub use stream::RelayEvent;
