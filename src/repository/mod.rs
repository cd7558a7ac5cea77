// ==========================================
// 代购业务数据迁移 - 数据仓储层
// ==========================================
// 职责: 数据访问,不含业务逻辑
// 红线: Repository 不含业务规则,只做数据 CRUD
// ==========================================

pub mod error;
pub mod migration_store;
pub mod sqlite_store;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use migration_store::{EntityKind, MigrationStore};
pub use sqlite_store::SqliteMigrationStore;
