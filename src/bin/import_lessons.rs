use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lesson_admin::app;
use lesson_admin::config::Config;
use lesson_admin::utils::logging;
use tracing::error;

/// 从 JSON 种子文件导入课程和页面到 Firestore
#[derive(Debug, Parser)]
#[command(name = "import_lessons", version, about)]
struct Cli {
    /// 种子文件路径（默认: 项目根目录下的 rsi_lesson_seed.json）
    seed_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志
    logging::init();

    // 加载配置
    let config = match Config::load(".") {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    let project_hint = config.project_id_hint.clone();

    match app::import_lessons(config, cli.seed_file).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(path) = app::missing_credentials_path(&e) {
                logging::log_missing_credentials(path, Some(&project_hint));
            } else {
                error!("❌ 导入失败: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
