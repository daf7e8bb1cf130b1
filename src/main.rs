use anyhow::Result;
use feed_reply::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用（日志在初始化时启动）
    App::initialize(config).await?.run().await?;

    Ok(())
}
