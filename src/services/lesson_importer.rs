//! 课程导入服务
//!
//! 按种子文件顺序逐个课程写入：先整体覆盖课程文档，再把该课程的全部页面
//! 放进一个批次提交。任何错误立即中止，已提交的课程保留。

use serde_json::Value as JsonValue;
use tracing::info;

use crate::error::AppResult;
use crate::models::lesson::{LessonRecord, LessonSeed};
use crate::store::{CollectionPath, DocumentStore, WriteBatch};

/// 课程集合
pub const LESSONS_COLLECTION: &str = "lessons";
/// 页面子集合
pub const SCREENS_COLLECTION: &str = "screens";

/// 导入统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub lessons: usize,
    pub screens: usize,
}

/// 课程导入服务
pub struct LessonImporter<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> LessonImporter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// 导入整个种子文件
    pub async fn import(&self, seed: &LessonSeed) -> AppResult<ImportStats> {
        info!("📚 正在导入课程到 Firestore...\n");

        let mut stats = ImportStats::default();
        for (lesson_id, value) in &seed.entries {
            stats.screens += self.import_lesson(lesson_id, value).await?;
            stats.lessons += 1;
        }

        Ok(stats)
    }

    /// 导入单个课程，返回写入的页面数
    pub async fn import_lesson(&self, lesson_id: &str, value: &JsonValue) -> AppResult<usize> {
        info!("正在导入课程: {}", lesson_id);

        let lesson = LessonRecord::from_entry(lesson_id, value)?;
        let lesson_path = CollectionPath::root(LESSONS_COLLECTION).doc(&lesson.id);

        self.store
            .set_document(&lesson_path, lesson.fields.clone())
            .await?;
        info!("  ✓ 课程文档已写入");

        let mut screen_count = 0;
        if let Some(screens) = lesson.screens {
            let screens_path = lesson_path.collection(SCREENS_COLLECTION);
            let mut batch = WriteBatch::new();
            for screen in screens {
                batch.set(screens_path.doc(screen.id), screen.fields);
                screen_count += 1;
            }

            self.store.commit(batch).await?;
            info!("  ✓ 已导入 {} 个页面", screen_count);
        }

        info!("✅ {} 导入成功\n", lesson_id);
        Ok(screen_count)
    }
}
