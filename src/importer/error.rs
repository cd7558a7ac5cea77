// ==========================================
// 代购业务数据迁移 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级失败不走此类型（记入 StageOutcome），
//       这里只描述会终止运行的致命错误
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx）")]
    UnsupportedFormat(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("工作表读取失败 (sheet {sheet}): {message}")]
    SheetReadError { sheet: String, message: String },

    // ===== 数据库错误 =====
    #[error("存储层错误: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>（ConfigManager 直接查询 config_kv）
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
