//! 内存文档存储
//!
//! 与 Firestore 相同的覆盖/合并语义，另外记录读写次数，便于测试断言。

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{AppResult, StoreError};
use crate::models::value::Fields;
use crate::store::{CollectionPath, Document, DocumentPath, DocumentStore, Write, WriteBatch};

#[derive(Debug, Default)]
struct Inner {
    documents: BTreeMap<DocumentPath, Fields>,
    reads: usize,
    commits: usize,
}

/// 内存文档存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入文档（不计入提交次数）
    pub fn insert(&self, path: DocumentPath, fields: Fields) {
        self.lock().documents.insert(path, fields);
    }

    pub fn get(&self, path: &DocumentPath) -> Option<Fields> {
        self.lock().documents.get(path).cloned()
    }

    /// 列表请求次数
    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    /// 提交次数
    pub fn commit_count(&self) -> usize {
        self.lock().commits
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    async fn list_documents(&self, collection: &CollectionPath) -> AppResult<Vec<Document>> {
        let mut inner = self.lock();
        inner.reads += 1;

        let prefix = collection.segments();
        let docs = inner
            .documents
            .iter()
            .filter(|(path, _)| {
                let segments = path.segments();
                segments.len() == prefix.len() + 1 && segments.starts_with(prefix)
            })
            .map(|(path, fields)| Document {
                path: path.clone(),
                fields: fields.clone(),
            })
            .collect();

        Ok(docs)
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        batch.check_size()?;
        let mut inner = self.lock();

        // 先整体校验，保证批次原子性
        for write in batch.writes() {
            if let Write::Update { path, .. } = write {
                if !inner.documents.contains_key(path) {
                    return Err(StoreError::NotFound(path.to_string()).into());
                }
            }
        }

        for write in batch.writes() {
            match write {
                Write::Set { path, fields } => {
                    inner.documents.insert(path.clone(), fields.clone());
                }
                Write::Update { path, fields } => {
                    if let Some(existing) = inner.documents.get_mut(path) {
                        existing.extend(fields.clone());
                    }
                }
            }
        }
        inner.commits += 1;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::value::FieldValue;

    fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_set_replaces_whole_document() {
        let store = MemoryStore::new();
        let path = CollectionPath::root("lessons").doc("L1");
        store.insert(
            path.clone(),
            fields(&[("old", FieldValue::Boolean(true)), ("title", FieldValue::Null)]),
        );

        store
            .set_document(&path, fields(&[("title", FieldValue::String("new".into()))]))
            .await
            .unwrap();

        let doc = store.get(&path).unwrap();
        assert!(!doc.contains_key("old"));
        assert_eq!(doc["title"].as_str(), Some("new"));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let path = CollectionPath::root("lessons").doc("L1");
        store.insert(path.clone(), fields(&[("text", FieldValue::String("a".into()))]));

        let mut batch = WriteBatch::new();
        batch.update(path.clone(), fields(&[("order", FieldValue::Integer(1))]));
        store.commit(batch).await.unwrap();

        let doc = store.get(&path).unwrap();
        assert_eq!(doc["text"].as_str(), Some("a"));
        assert_eq!(doc["order"].as_i64(), Some(1));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails_whole_batch() {
        let store = MemoryStore::new();
        let screens = CollectionPath::root("lessons").doc("L1").collection("screens");
        store.insert(screens.doc("s1"), Fields::new());

        let mut batch = WriteBatch::new();
        batch.update(screens.doc("s1"), fields(&[("order", FieldValue::Integer(1))]));
        batch.update(screens.doc("s2"), fields(&[("order", FieldValue::Integer(2))]));

        assert!(store.commit(batch).await.is_err());
        assert!(!store.get(&screens.doc("s1")).unwrap().contains_key("order"));
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_list_only_direct_children() {
        let store = MemoryStore::new();
        let lessons = CollectionPath::root("lessons");
        store.insert(lessons.doc("L2"), Fields::new());
        store.insert(lessons.doc("L1"), Fields::new());
        store.insert(lessons.doc("L1").collection("screens").doc("s1"), Fields::new());

        let docs = store.list_documents(&lessons).await.unwrap();
        let ids: Vec<&str> = docs.iter().map(Document::id).collect();
        assert_eq!(ids, vec!["L1", "L2"]);
        assert_eq!(store.read_count(), 1);
    }
}
