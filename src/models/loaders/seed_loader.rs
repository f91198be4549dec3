use std::path::Path;

use serde_json::Value as JsonValue;
use tokio::fs;

use crate::error::{AppResult, ConfigError, ParseError};
use crate::models::lesson::LessonSeed;

/// 从 JSON 种子文件加载课程数据
///
/// 文件不存在属于配置错误，在任何网络请求之前返回。
pub async fn load_seed_file(seed_path: &Path) -> AppResult<LessonSeed> {
    if !seed_path.exists() {
        return Err(ConfigError::SeedNotFound {
            path: seed_path.to_path_buf(),
        }
        .into());
    }

    let content = fs::read_to_string(seed_path)
        .await
        .map_err(|source| ConfigError::ReadFailed {
            path: seed_path.to_path_buf(),
            source,
        })?;

    let value: JsonValue = serde_json::from_str(&content)
        .map_err(|e| ParseError::json(seed_path.display().to_string(), e))?;

    let seed = LessonSeed::from_json(value)?;
    tracing::info!(
        "正在加载: {} ({} 个课程)",
        seed_path.file_name().unwrap_or_default().to_string_lossy(),
        seed.len()
    );

    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_missing_seed_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_seed_file(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::SeedNotFound { .. })));
    }

    #[tokio::test]
    async fn test_malformed_seed_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_seed_file(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(ParseError::Json { .. })));
    }

    #[tokio::test]
    async fn test_top_level_must_be_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = load_seed_file(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(ParseError::UnexpectedShape { .. })));
    }

    #[tokio::test]
    async fn test_loads_lessons() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{"L1": {"title": "Intro"}, "L2": {}}"#).unwrap();

        let seed = load_seed_file(&path).await.unwrap();
        assert_eq!(seed.len(), 2);
    }
}
