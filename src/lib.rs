//! # Lesson Admin
//!
//! 课程数据的 Firestore 管理工具：`import_lessons` 导入种子数据，
//! `fix_screen_order` 为页面补写 `order` 字段
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 读取服务账号凭证，不发起网络请求
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - Firestore REST 客户端与访问令牌
//! - `store/` - `DocumentStore` 能力抽象与内存实现
//!
//! ### ③ 业务能力层（Services）
//! - `LessonImporter` - 课程/页面导入
//! - `OrderBackfill` - 页面序号补写
//! - `ScreenOrderParser` - 单个页面的序号判断
//!
//! ### ④ 编排层（App）
//! - `app` - 凭证 → 种子 → 连接 → 执行 → 统计

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use clients::FirestoreClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::{DocumentStore, MemoryStore};
