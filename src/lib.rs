// ==========================================
// 代购业务数据迁移 - 核心库
// ==========================================
// 技术栈: Rust + calamine + SQLite
// 系统定位: 一次性历史台账迁移（Excel → 关系库）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 工作簿解析与迁移流程
pub mod importer;

// 配置层 - 迁移配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{InstallmentKind, ShippingChannel, TierCode};

// 领域实体
pub use domain::{Customer, Order, OrderItem, Payment, Tier};

// 导入
pub use importer::{
    DuplicateItemCodePolicy, ImportError, ImportResult, MigrationPipeline, RunReport, RunSummary,
    WorkbookSource, XlsxWorkbook,
};

// 存储
pub use repository::{MigrationStore, RepositoryError, SqliteMigrationStore};

// 配置
pub use config::{ConfigManager, MigrationSettings};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "代购业务数据迁移";
