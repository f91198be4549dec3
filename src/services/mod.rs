pub mod lesson_importer;
pub mod order_backfill;
pub mod screen_order;

pub use lesson_importer::{ImportStats, LessonImporter};
pub use order_backfill::{BackfillStats, OrderBackfill};
pub use screen_order::{OrderDecision, ScreenOrderParser};
