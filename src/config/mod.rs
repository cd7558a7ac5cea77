// ==========================================
// 代购业务数据迁移 - 配置层
// ==========================================
// 职责: 迁移配置读取（工作簿路径 / 工作表名 / 策略）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod migration_config_trait;
pub mod migration_settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use migration_config_trait::{MigrationConfigReader, SheetRole};
pub use migration_settings::{MigrationSettings, SheetNames};
