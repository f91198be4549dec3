use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 可选配置文件名（位于项目根目录）
pub const CONFIG_FILE_NAME: &str = "lesson_admin.toml";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 项目根目录，相对路径都基于它解析
    pub project_root: PathBuf,
    /// 服务账号凭证文件
    pub credentials_path: PathBuf,
    /// 默认种子文件
    pub seed_path: PathBuf,
    /// Firestore REST 地址
    pub firestore_endpoint: String,
    /// 数据库 ID
    pub database_id: String,
    /// 提示信息中展示的项目 ID
    pub project_id_hint: String,
    /// 列表请求的分页大小
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_root(".")
    }
}

/// 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    credentials_path: Option<PathBuf>,
    seed_path: Option<PathBuf>,
    firestore_endpoint: Option<String>,
    database_id: Option<String>,
    project_id_hint: Option<String>,
    page_size: Option<u32>,
}

impl Config {
    /// 以指定目录为项目根目录的默认配置
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let project_root = root.into();
        Self {
            credentials_path: project_root.join("serviceAccountKey.json"),
            seed_path: project_root.join("rsi_lesson_seed.json"),
            firestore_endpoint: "https://firestore.googleapis.com".to_string(),
            database_id: "(default)".to_string(),
            project_id_hint: "marketcoach-db8f4".to_string(),
            page_size: 300,
            project_root,
        }
    }

    /// 加载配置：默认值，再叠加根目录下的 `lesson_admin.toml`（如果存在）
    pub fn load(root: impl Into<PathBuf>) -> AppResult<Self> {
        let mut config = Self::for_root(root);
        let path = config.project_root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|source| ConfigError::InvalidConfigFile { path, source })?;

        config.apply(file);
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) {
        if let Some(p) = file.credentials_path {
            self.credentials_path = self.resolve(&p);
        }
        if let Some(p) = file.seed_path {
            self.seed_path = self.resolve(&p);
        }
        if let Some(endpoint) = file.firestore_endpoint {
            self.firestore_endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(db) = file.database_id {
            self.database_id = db;
        }
        if let Some(hint) = file.project_id_hint {
            self.project_id_hint = hint;
        }
        if let Some(size) = file.page_size {
            self.page_size = size.max(1);
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}
