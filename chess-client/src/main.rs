use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chess_client::settings::ClientSettings;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = ClientSettings::load();

    // 初始化日志（输出到 stderr，stdout 留给棋盘）
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("chess_client={}", settings.log_level.as_directive()).parse()?,
            ),
        )
        .init();

    info!("混沌象棋客户端启动中...");

    chess_client::app::run(settings).await
}
