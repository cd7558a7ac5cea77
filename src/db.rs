// ==========================================
// 代购业务数据迁移 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - 建库脚本幂等执行，重复运行不破坏已有数据
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version（与 `scripts/schema.sql` 对齐）
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建库脚本
const SCHEMA_SQL: &str = include_str!("../scripts/schema.sql");

/// 默认数据库文件名
const DB_FILE_NAME: &str = "agency.db";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 执行建库脚本（IF NOT EXISTS，幂等）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 默认数据库路径: <用户数据目录>/agency-import/agency.db
///
/// 拿不到用户数据目录时退回当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from(".");

    if let Some(data_dir) = dirs::data_dir() {
        path = data_dir.join("agency-import");
        // 目录创建失败时 open 会给出明确错误
        std::fs::create_dir_all(&path).ok();
    }

    path.join(DB_FILE_NAME).to_string_lossy().to_string()
}
