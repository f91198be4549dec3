use std::process::ExitCode;

use clap::Parser;
use lesson_admin::app;
use lesson_admin::config::Config;
use lesson_admin::utils::logging;
use tracing::error;

/// 为缺少 order 字段的页面按 ID 末尾数字补写序号
#[derive(Debug, Parser)]
#[command(name = "fix_screen_order", version, about)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    let _cli = Cli::parse();
    logging::init();

    let config = match Config::load(".") {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    match app::fix_screen_order(config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(path) = app::missing_credentials_path(&e) {
                logging::log_missing_credentials(path, None);
            } else {
                error!("❌ 修复失败: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
