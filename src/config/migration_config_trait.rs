// ==========================================
// 代购业务数据迁移 - 迁移配置读取 Trait
// ==========================================
// 职责: 定义迁移流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::correlation::DuplicateItemCodePolicy;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

/// 工作簿中参与迁移的工作表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetRole {
    Air,
    Sea,
    Pickup,
    Payments,
}

impl SheetRole {
    /// config_kv 键后缀
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetRole::Air => "air",
            SheetRole::Sea => "sea",
            SheetRole::Pickup => "pickup",
            SheetRole::Payments => "payments",
        }
    }

    /// 源工作簿中的默认工作表名
    pub fn default_sheet_name(&self) -> &'static str {
        match self {
            SheetRole::Air => "MIRIN เครื่องบิน 2025",
            SheetRole::Sea => "MIRIN เรือ 2025",
            SheetRole::Pickup => "ออเดอร์สินค้าซื้อหน้าร้าน",
            SheetRole::Payments => "เงินเข้า",
        }
    }
}

// ==========================================
// MigrationConfigReader Trait
// ==========================================
// 用途: 迁移流程所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait MigrationConfigReader: Send + Sync {
    /// 获取源工作簿路径
    ///
    /// # 默认值
    /// - data/agency_full_system_with_expenses.xlsx
    async fn get_workbook_path(&self) -> ImportResult<String>;

    /// 获取指定角色的工作表名
    ///
    /// # 默认值
    /// - SheetRole::default_sheet_name
    async fn get_sheet_name(&self, role: SheetRole) -> ImportResult<String>;

    /// 获取重复 Item Code 处理策略
    ///
    /// # 默认值
    /// - reject
    async fn get_duplicate_item_code_policy(&self) -> ImportResult<DuplicateItemCodePolicy>;

    /// 获取进度日志间隔（每创建多少条输出一次）
    ///
    /// # 默认值
    /// - 50
    async fn get_progress_every(&self) -> ImportResult<usize>;
}
