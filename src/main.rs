use anyhow::Result;
use tender_scrape::utils::logging;
use tender_scrape::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init_with_default(if config.verbose_logging { "debug" } else { "info" });

    // 初始化并运行应用
    let outcome = App::initialize(config).await?.run().await?;
    println!("{}", outcome.final_output);

    Ok(())
}
