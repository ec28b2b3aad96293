//! 服务入口
//!
//! 加载 .env、初始化日志、读取配置、启动 HTTP 服务。

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use flowcast_lib::{run_server, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env()?;

    // 启动时先验一次令牌。不合法也照常启动:
    // 健康检查和静态页不受影响，转发请求会逐个被拒绝
    if config.validate_token() {
        info!("[MAIN] 令牌校验通过，启动服务");
    } else {
        error!("[MAIN] 令牌未配置或仍是占位符，转发请求将全部被拒绝");
        error!("[MAIN] 请在 LANGFLOW_TOKEN 环境变量中设置应用令牌");
    }

    run_server(config).await
}
