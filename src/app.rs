use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::clients::FirestoreClient;
use crate::config::Config;
use crate::error::{AppError, ConfigError};
use crate::infrastructure::{load_credentials, ServiceAccount};
use crate::models::{load_seed_file, LessonSeed};
use crate::services::{BackfillStats, ImportStats, LessonImporter, OrderBackfill};
use crate::store::DocumentStore;
use crate::utils::logging;

/// 应用主结构
///
/// 持有唯一的数据库客户端，生命周期为 初始化 → 使用 → 进程退出时释放
pub struct App<S: DocumentStore = FirestoreClient> {
    store: S,
}

impl App<FirestoreClient> {
    /// 读取凭证并连接数据库
    pub async fn initialize(config: Config) -> Result<Self> {
        let account = load_credentials(&config.credentials_path)?;
        Self::connect(config, account).await
    }

    /// 使用已读取的凭证连接数据库
    pub async fn connect(config: Config, account: ServiceAccount) -> Result<Self> {
        let client = FirestoreClient::connect(&config, account)
            .await
            .context("连接 Firestore 失败")?;
        logging::log_startup("已连接 Firestore", client.project_id());

        Ok(Self::with_store(client))
    }
}

impl<S: DocumentStore> App<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 导入种子数据
    pub async fn import_lessons(&self, seed: &LessonSeed) -> Result<ImportStats> {
        let stats = LessonImporter::new(&self.store)
            .import(seed)
            .await
            .context("导入课程失败")?;
        logging::print_import_stats(&stats);
        Ok(stats)
    }

    /// 补写页面 order 字段
    pub async fn fix_screen_order(&self) -> Result<BackfillStats> {
        let stats = OrderBackfill::new(&self.store)?
            .run()
            .await
            .context("修复页面 order 失败")?;
        logging::print_backfill_stats(&stats);
        Ok(stats)
    }
}

/// `import_lessons` 命令
///
/// 凭证与种子文件都在任何网络请求之前检查
pub async fn import_lessons(config: Config, seed_path: Option<PathBuf>) -> Result<ImportStats> {
    let account = load_credentials(&config.credentials_path)?;

    let seed_path = seed_path.unwrap_or_else(|| config.seed_path.clone());
    let seed = load_seed_file(&seed_path).await?;
    if seed.is_empty() {
        info!("⚠️ 种子文件中没有课程: {}", seed_path.display());
    }

    App::connect(config, account).await?.import_lessons(&seed).await
}

/// `fix_screen_order` 命令
pub async fn fix_screen_order(config: Config) -> Result<BackfillStats> {
    App::initialize(config).await?.fix_screen_order().await
}

/// 取出凭证缺失错误中的路径
pub fn missing_credentials_path(err: &anyhow::Error) -> Option<&std::path::Path> {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(ConfigError::CredentialsNotFound { path })) => Some(path.as_path()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CollectionPath, MemoryStore};
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_credentials_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let err = fix_screen_order(Config::for_root(dir.path())).await.unwrap_err();
        assert_eq!(
            missing_credentials_path(&err),
            Some(dir.path().join("serviceAccountKey.json").as_path())
        );
    }

    #[tokio::test]
    async fn test_import_then_backfill_with_memory_store() {
        let app = App::with_store(MemoryStore::new());
        let seed = LessonSeed::from_json(json!({
            "L1": { "title": "Intro", "screens": { "screen_001": {}, "screen_002": { "order": 5 } } }
        }))
        .unwrap();

        app.import_lessons(&seed).await.unwrap();
        let stats = app.fix_screen_order().await.unwrap();

        assert_eq!(stats.updated, 1);
        let screens = CollectionPath::root("lessons").doc("L1").collection("screens");
        assert_eq!(
            app.store().get(&screens.doc("screen_001")).unwrap()["order"].as_i64(),
            Some(1)
        );
        assert_eq!(
            app.store().get(&screens.doc("screen_002")).unwrap()["order"].as_i64(),
            Some(5)
        );
    }
}
