// ==========================================
// 代购业务数据迁移 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// 说明: 迁移只使用 global scope
// ==========================================

use crate::config::migration_config_trait::{MigrationConfigReader, SheetRole};
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::importer::correlation::DuplicateItemCodePolicy;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// 默认源工作簿路径
pub const DEFAULT_WORKBOOK_PATH: &str = "data/agency_full_system_with_expenses.xlsx";

/// 默认进度日志间隔
pub const DEFAULT_PROGRESS_EVERY: usize = 50;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ImportResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值（空白值视为未配置）
    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取 global scope 全部配置（按键排序）
    pub fn get_config_snapshot(&self) -> ImportResult<HashMap<String, String>> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }
}

// ==========================================
// MigrationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl MigrationConfigReader for ConfigManager {
    async fn get_workbook_path(&self) -> ImportResult<String> {
        self.get_config_or_default(config_keys::WORKBOOK_PATH, DEFAULT_WORKBOOK_PATH)
    }

    async fn get_sheet_name(&self, role: SheetRole) -> ImportResult<String> {
        let key = config_keys::sheet_key(role);
        self.get_config_or_default(&key, role.default_sheet_name())
    }

    async fn get_duplicate_item_code_policy(&self) -> ImportResult<DuplicateItemCodePolicy> {
        let default = DuplicateItemCodePolicy::default();
        let value =
            self.get_config_or_default(config_keys::DUPLICATE_ITEM_CODE_POLICY, default.as_str())?;

        Ok(parse_duplicate_item_code_policy(&value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "重复 Item Code 策略配置无效，使用默认值");
            default
        }))
    }

    async fn get_progress_every(&self) -> ImportResult<usize> {
        let value = self.get_config_or_default(
            config_keys::PROGRESS_EVERY,
            &DEFAULT_PROGRESS_EVERY.to_string(),
        )?;

        Ok(parse_progress_every(&value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "进度间隔配置无效，使用默认值");
            DEFAULT_PROGRESS_EVERY
        }))
    }
}

/// 解析重复 Item Code 策略（reject | last_wins）
pub fn parse_duplicate_item_code_policy(value: &str) -> ImportResult<DuplicateItemCodePolicy> {
    DuplicateItemCodePolicy::parse(value).ok_or_else(|| ImportError::ConfigValueError {
        key: config_keys::DUPLICATE_ITEM_CODE_POLICY.to_string(),
        value: value.to_string(),
        message: "应为 reject 或 last_wins".to_string(),
    })
}

/// 解析进度日志间隔（正整数）
pub fn parse_progress_every(value: &str) -> ImportResult<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ImportError::ConfigValueError {
            key: config_keys::PROGRESS_EVERY.to_string(),
            value: value.to_string(),
            message: "必须大于 0".to_string(),
        }),
        Err(e) => Err(ImportError::ConfigValueError {
            key: config_keys::PROGRESS_EVERY.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        }),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    use crate::config::migration_config_trait::SheetRole;

    pub const WORKBOOK_PATH: &str = "migration/workbook_path";
    pub const DUPLICATE_ITEM_CODE_POLICY: &str = "migration/duplicate_item_code_policy";
    pub const PROGRESS_EVERY: &str = "migration/progress_every";

    /// 工作表名: migration/sheet/{air|sea|pickup|payments}
    pub fn sheet_key(role: SheetRole) -> String {
        format!("migration/sheet/{}", role.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let manager = memory_manager();

        assert_eq!(manager.get_workbook_path().await.unwrap(), DEFAULT_WORKBOOK_PATH);
        assert_eq!(
            manager.get_sheet_name(SheetRole::Payments).await.unwrap(),
            "เงินเข้า"
        );
        assert_eq!(
            manager.get_duplicate_item_code_policy().await.unwrap(),
            DuplicateItemCodePolicy::Reject
        );
        assert_eq!(manager.get_progress_every().await.unwrap(), DEFAULT_PROGRESS_EVERY);
    }

    #[tokio::test]
    async fn test_overrides() {
        let manager = memory_manager();
        manager
            .set_global_config_value(&config_keys::sheet_key(SheetRole::Air), "AIR 2026")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DUPLICATE_ITEM_CODE_POLICY, "last_wins")
            .unwrap();
        manager
            .set_global_config_value(config_keys::PROGRESS_EVERY, "10")
            .unwrap();

        assert_eq!(manager.get_sheet_name(SheetRole::Air).await.unwrap(), "AIR 2026");
        assert_eq!(
            manager.get_duplicate_item_code_policy().await.unwrap(),
            DuplicateItemCodePolicy::LastWins
        );
        assert_eq!(manager.get_progress_every().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_invalid_values_fall_back() {
        let manager = memory_manager();
        manager
            .set_global_config_value(config_keys::DUPLICATE_ITEM_CODE_POLICY, "first_wins")
            .unwrap();
        manager
            .set_global_config_value(config_keys::PROGRESS_EVERY, "0")
            .unwrap();
        manager
            .set_global_config_value(config_keys::WORKBOOK_PATH, "   ")
            .unwrap();

        assert_eq!(
            manager.get_duplicate_item_code_policy().await.unwrap(),
            DuplicateItemCodePolicy::Reject
        );
        assert_eq!(manager.get_progress_every().await.unwrap(), DEFAULT_PROGRESS_EVERY);
        assert_eq!(manager.get_workbook_path().await.unwrap(), DEFAULT_WORKBOOK_PATH);
    }

    #[test]
    fn test_invalid_values_report_config_value_error() {
        let err = parse_progress_every("abc").unwrap_err();
        assert!(matches!(
            err,
            ImportError::ConfigValueError { ref key, ref value, .. }
                if key == config_keys::PROGRESS_EVERY && value == "abc"
        ));
        assert!(matches!(
            parse_progress_every("0"),
            Err(ImportError::ConfigValueError { .. })
        ));
        assert_eq!(parse_progress_every("25").unwrap(), 25);

        let err = parse_duplicate_item_code_policy("first_wins").unwrap_err();
        assert!(matches!(
            err,
            ImportError::ConfigValueError { ref key, .. }
                if key == config_keys::DUPLICATE_ITEM_CODE_POLICY
        ));
        assert_eq!(
            parse_duplicate_item_code_policy("last-wins").unwrap(),
            DuplicateItemCodePolicy::LastWins
        );
    }

    #[test]
    fn test_snapshot() {
        let manager = memory_manager();
        manager
            .set_global_config_value(config_keys::PROGRESS_EVERY, "20")
            .unwrap();
        manager
            .set_global_config_value(config_keys::PROGRESS_EVERY, "25")
            .unwrap();

        let snapshot = manager.get_config_snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[config_keys::PROGRESS_EVERY], "25");
    }
}
