//! 文档数据库抽象
//!
//! 两个工具只需要"列出集合中的文档"和"原子提交一批写入"两种能力。
//! `FirestoreClient` 通过 REST 实现，`MemoryStore` 用于测试。

pub mod memory;

use std::fmt;

use crate::error::{AppResult, StoreError};
use crate::models::value::Fields;

pub use memory::MemoryStore;

/// 单次提交的最大写入数
pub const MAX_BATCH_WRITES: usize = 500;

/// 集合路径，例如 `lessons` 或 `lessons/L1/screens`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

/// 文档路径，例如 `lessons/L1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// 顶层集合
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn doc(&self, id: impl Into<String>) -> DocumentPath {
        let mut segments = self.segments.clone();
        segments.push(id.into());
        DocumentPath { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl DocumentPath {
    /// 子集合
    pub fn collection(&self, name: impl Into<String>) -> CollectionPath {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        CollectionPath { segments }
    }

    /// 文档 ID（最后一段）
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 由相对路径段构建，段数必须为偶数且不为空
    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() || segments.len() % 2 != 0 {
            return None;
        }
        Some(Self { segments })
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// 读取到的文档
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocumentPath,
    pub fields: Fields,
}

impl Document {
    pub fn id(&self) -> &str {
        self.path.id()
    }
}

/// 单个写入操作
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// 整体覆盖，丢弃未给出的字段
    Set { path: DocumentPath, fields: Fields },
    /// 合并更新，只修改给出的字段；文档必须已存在
    Update { path: DocumentPath, fields: Fields },
}

/// 原子提交的一批写入
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: DocumentPath, fields: Fields) -> &mut Self {
        self.writes.push(Write::Set { path, fields });
        self
    }

    pub fn update(&mut self, path: DocumentPath, fields: Fields) -> &mut Self {
        self.writes.push(Write::Update { path, fields });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    /// 提交前检查写入数量上限
    pub fn check_size(&self) -> Result<(), StoreError> {
        if self.writes.len() > MAX_BATCH_WRITES {
            return Err(StoreError::BatchTooLarge {
                count: self.writes.len(),
                max: MAX_BATCH_WRITES,
            });
        }
        Ok(())
    }
}

/// 文档数据库能力
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// 列出集合中的全部文档（按文档 ID 排序）
    async fn list_documents(&self, collection: &CollectionPath) -> AppResult<Vec<Document>>;

    /// 原子提交一批写入
    async fn commit(&self, batch: WriteBatch) -> AppResult<()>;

    /// 整体覆盖单个文档
    async fn set_document(&self, path: &DocumentPath, fields: Fields) -> AppResult<()> {
        let mut batch = WriteBatch::new();
        batch.set(path.clone(), fields);
        self.commit(batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_render_nested_collections() {
        let lesson = CollectionPath::root("lessons").doc("L1");
        let screen = lesson.collection("screens").doc("screen_001");
        assert_eq!(lesson.to_string(), "lessons/L1");
        assert_eq!(screen.to_string(), "lessons/L1/screens/screen_001");
        assert_eq!(screen.id(), "screen_001");
        assert_eq!(
            lesson.collection("screens").to_string(),
            "lessons/L1/screens"
        );
    }

    #[test]
    fn test_document_path_needs_even_segments() {
        assert!(DocumentPath::from_segments(vec!["lessons".into()]).is_none());
        assert!(DocumentPath::from_segments(vec![]).is_none());
        assert!(DocumentPath::from_segments(vec!["lessons".into(), "L1".into()]).is_some());
    }

    #[test]
    fn test_batch_size_limit() {
        let lessons = CollectionPath::root("lessons");
        let mut batch = WriteBatch::new();
        for i in 0..MAX_BATCH_WRITES {
            batch.set(lessons.doc(format!("L{}", i)), Fields::new());
        }
        assert!(batch.check_size().is_ok());

        batch.set(lessons.doc("one-more"), Fields::new());
        assert!(matches!(
            batch.check_size(),
            Err(StoreError::BatchTooLarge { count: 501, max: 500 })
        ));
    }
}
