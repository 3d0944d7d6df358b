use anyhow::Context;
use cep_race::utils::{logger, validation::Validate};
use cep_race::{CliConfig, RaceOrchestrator};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting cep-race CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    let config = match cli.validate().and_then(|_| cli.resolve()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let orchestrator =
        RaceOrchestrator::from_config(&config).context("failed to build provider clients")?;

    // 不論結果為何都只輸出一個區塊，結束碼為 0
    let outcome = orchestrator.run(&cli.cep).await;
    println!("{}", outcome.render());

    Ok(())
}
