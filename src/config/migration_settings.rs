// ==========================================
// 代购业务数据迁移 - 运行配置快照
// ==========================================
// 运行开始时一次性读取，运行期间不变
// ==========================================

use crate::config::config_manager::{DEFAULT_PROGRESS_EVERY, DEFAULT_WORKBOOK_PATH};
use crate::config::migration_config_trait::{MigrationConfigReader, SheetRole};
use crate::importer::correlation::DuplicateItemCodePolicy;
use crate::importer::error::ImportResult;

#[derive(Debug, Clone, PartialEq)]
pub struct SheetNames {
    pub air: String,
    pub sea: String,
    pub pickup: String,
    pub payments: String,
}

impl SheetNames {
    pub fn get(&self, role: SheetRole) -> &str {
        match role {
            SheetRole::Air => &self.air,
            SheetRole::Sea => &self.sea,
            SheetRole::Pickup => &self.pickup,
            SheetRole::Payments => &self.payments,
        }
    }
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            air: SheetRole::Air.default_sheet_name().to_string(),
            sea: SheetRole::Sea.default_sheet_name().to_string(),
            pickup: SheetRole::Pickup.default_sheet_name().to_string(),
            payments: SheetRole::Payments.default_sheet_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationSettings {
    pub workbook_path: String,
    pub sheets: SheetNames,
    pub duplicate_item_code_policy: DuplicateItemCodePolicy,
    pub progress_every: usize,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            workbook_path: DEFAULT_WORKBOOK_PATH.to_string(),
            sheets: SheetNames::default(),
            duplicate_item_code_policy: DuplicateItemCodePolicy::default(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl MigrationSettings {
    /// 从配置读取器加载全部迁移配置
    pub async fn load(reader: &dyn MigrationConfigReader) -> ImportResult<Self> {
        Ok(Self {
            workbook_path: reader.get_workbook_path().await?,
            sheets: SheetNames {
                air: reader.get_sheet_name(SheetRole::Air).await?,
                sea: reader.get_sheet_name(SheetRole::Sea).await?,
                pickup: reader.get_sheet_name(SheetRole::Pickup).await?,
                payments: reader.get_sheet_name(SheetRole::Payments).await?,
            },
            duplicate_item_code_policy: reader.get_duplicate_item_code_policy().await?,
            progress_every: reader.get_progress_every().await?,
        })
    }
}
