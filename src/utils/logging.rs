/// 日志工具模块
///
/// 提供日志初始化、提示信息和统计输出的辅助函数
use std::path::Path;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::services::{BackfillStats, ImportStats};

/// 初始化日志
///
/// 默认级别为 info，可通过 `RUST_LOG` 调整
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // 重复初始化（例如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}

/// 凭证文件缺失时的获取说明
///
/// # 参数
/// - `path`: 期望的凭证文件路径
/// - `project_id`: 需要在说明中指明的项目（导入工具会给出）
pub fn credentials_help(path: &Path, project_id: Option<&str>) -> Vec<String> {
    let mut lines = vec![
        format!("❌ 错误: 未找到 {}!", path.display()),
        String::new(),
        "请从 Firebase Console 下载服务账号密钥:".to_string(),
        "1. 打开 Firebase Console: https://console.firebase.google.com/".to_string(),
    ];
    if let Some(project) = project_id {
        lines.push(format!("2. 选择项目: {}", project));
    }
    let step = if project_id.is_some() { 3 } else { 2 };
    lines.push(format!("{}. 进入 Project Settings > Service Accounts", step));
    lines.push(format!("{}. 点击 \"Generate New Private Key\"", step + 1));
    lines.push(format!(
        "{}. 保存为项目根目录下的 {}",
        step + 2,
        path.file_name().unwrap_or_default().to_string_lossy()
    ));
    lines
}

/// 输出凭证缺失说明
pub fn log_missing_credentials(path: &Path, project_id: Option<&str>) {
    let mut lines = credentials_help(path, project_id).into_iter();
    if let Some(first) = lines.next() {
        error!("{}", first);
    }
    for line in lines {
        info!("{}", line);
    }
}

/// 记录程序启动信息
pub fn log_startup(title: &str, project_id: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 {}", title);
    info!("📊 项目: {}", project_id);
    info!("{}", "=".repeat(60));
}

/// 打印导入统计
pub fn print_import_stats(stats: &ImportStats) {
    info!("{}", "=".repeat(60));
    info!("🎉 全部课程导入成功!");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📚 课程: {}", stats.lessons);
    info!("📄 页面: {}", stats.screens);
    info!("{}", "=".repeat(60));
}

/// 打印序号补写统计
pub fn print_backfill_stats(stats: &BackfillStats) {
    info!("{}", "=".repeat(60));
    info!("🎉 页面 order 字段修复完成!");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📚 课程: {} (无页面: {})", stats.lessons, stats.lessons_without_screens);
    info!("✅ 补写: {}", stats.updated);
    info!("➖ 已存在: {}", stats.already_present);
    info!("⚠️ 无法解析: {}", stats.unparseable);
    info!("{}", "=".repeat(60));
}
