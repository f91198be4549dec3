//! 页面序号补写服务
//!
//! 遍历所有课程的页面，为缺少 `order` 的页面按 ID 末尾数字补写。
//! 已有 `order` 的页面从不改写，因此可以重复运行。

use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::value::{FieldValue, Fields};
use crate::services::lesson_importer::{LESSONS_COLLECTION, SCREENS_COLLECTION};
use crate::services::screen_order::{OrderDecision, ScreenOrderParser, ORDER_FIELD};
use crate::store::{CollectionPath, Document, DocumentStore, WriteBatch};

/// 补写统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillStats {
    /// 扫描的课程数
    pub lessons: usize,
    /// 没有页面的课程数
    pub lessons_without_screens: usize,
    /// 补写了 order 的页面数
    pub updated: usize,
    /// 已有 order 的页面数
    pub already_present: usize,
    /// ID 无法解析出序号的页面数
    pub unparseable: usize,
}

/// 页面序号补写服务
pub struct OrderBackfill<'a, S: DocumentStore> {
    store: &'a S,
    parser: ScreenOrderParser,
}

impl<'a, S: DocumentStore> OrderBackfill<'a, S> {
    pub fn new(store: &'a S) -> AppResult<Self> {
        Ok(Self {
            store,
            parser: ScreenOrderParser::new()?,
        })
    }

    /// 处理全部课程
    pub async fn run(&self) -> AppResult<BackfillStats> {
        info!("🔧 正在修复 Firestore 中的页面 order 字段...\n");

        let lessons = self
            .store
            .list_documents(&CollectionPath::root(LESSONS_COLLECTION))
            .await?;

        let mut stats = BackfillStats::default();
        for lesson in &lessons {
            self.backfill_lesson(lesson, &mut stats).await?;
            stats.lessons += 1;
        }

        Ok(stats)
    }

    /// 处理单个课程
    async fn backfill_lesson(&self, lesson: &Document, stats: &mut BackfillStats) -> AppResult<()> {
        info!("正在处理课程: {}", lesson.id());

        let screens = self
            .store
            .list_documents(&lesson.path.collection(SCREENS_COLLECTION))
            .await?;

        if screens.is_empty() {
            info!("  ⚠️  没有找到页面");
            stats.lessons_without_screens += 1;
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        let mut update_count = 0;

        for screen in &screens {
            let screen_id = screen.id();
            match self.parser.decide(screen_id, &screen.fields) {
                OrderDecision::Assign(order) => {
                    let fields = Fields::from([(ORDER_FIELD.to_string(), FieldValue::Integer(order))]);
                    batch.update(screen.path.clone(), fields);
                    info!("  ✓ {}: 补写 order = {}", screen_id, order);
                    update_count += 1;
                }
                OrderDecision::AlreadyPresent(existing) => {
                    info!("  - {}: order 已存在 ({})", screen_id, display_value(&existing));
                    stats.already_present += 1;
                }
                OrderDecision::NoDigitSuffix => {
                    warn!("  ⚠️  {}: 无法从 ID 中解析 order", screen_id);
                    stats.unparseable += 1;
                }
                OrderDecision::OutOfRange(digits) => {
                    warn!("  ⚠️  {}: 序号 {} 超出范围，跳过", screen_id, digits);
                    stats.unparseable += 1;
                }
            }
        }

        if update_count > 0 {
            self.store.commit(batch).await?;
            info!("  ✅ 已更新 {} 个页面\n", update_count);
        } else {
            info!("  ✓ 所有页面都已有 order 字段\n");
        }

        stats.updated += update_count;
        Ok(())
    }
}

/// 日志中展示已有的 order 值
fn display_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Double(d) => d.to_string(),
        FieldValue::String(s) => s.clone(),
        FieldValue::Boolean(b) => b.to_string(),
        FieldValue::Null => "null".to_string(),
        other => format!("{:?}", other),
    }
}
