// ==========================================
// 代购业务数据迁移 - 客户身份解析
// ==========================================
// 职责:
// 1. 跨三个订单来源去重，建立客户登记表（先出现者的等级为准）
// 2. 按自然键（客户代码）幂等创建客户，输出 客户代码 → 客户身份
// ==========================================

use crate::domain::{Customer, NewCustomer, TierCode};
use crate::importer::field_mapper::map_customer_ref;
use crate::importer::sheet_reader::RawRecord;
use crate::importer::stage::{SkipReason, StageOutcome};
use crate::repository::MigrationStore;
use std::collections::HashMap;
use tracing::{debug, error, info};

// ==========================================
// CustomerRegistry - 客户登记表
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub code: String,
    pub tier_code: TierCode,
}

/// 按首次出现顺序保存的客户登记表
#[derive(Debug, Default, Clone)]
pub struct CustomerRegistry {
    entries: Vec<RegistryEntry>,
    positions: HashMap<String, usize>,
}

impl CustomerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按顺序扫描多个工作表的记录
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        let mut registry = Self::new();
        for record in records {
            let customer = map_customer_ref(record);
            if let Some(code) = customer.code {
                registry.register(&code, &customer.customer_type);
            }
        }
        registry
    }

    /// 登记客户，已登记的代码忽略（先出现者为准）
    ///
    /// # 返回
    /// - true: 新登记
    /// - false: 已存在
    pub fn register(&mut self, code: &str, customer_type: &str) -> bool {
        if self.positions.contains_key(code) {
            return false;
        }

        self.positions.insert(code.to_string(), self.entries.len());
        self.entries.push(RegistryEntry {
            code: code.to_string(),
            tier_code: TierCode::from_customer_type(customer_type),
        });
        true
    }

    pub fn get(&self, code: &str) -> Option<&RegistryEntry> {
        self.positions.get(code).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==========================================
// CustomerResolution - 客户创建结果
// ==========================================
#[derive(Debug, Default)]
pub struct CustomerResolution {
    /// 客户代码 → 客户身份
    pub ids: HashMap<String, String>,
    pub outcome: StageOutcome<Customer>,
}

/// 为登记表中的每个客户确保存在一条客户记录
///
/// # 规则
/// - 已有 display_name 相同的客户 → 复用其身份（ExistingCustomer）
/// - 否则创建；唯一约束冲突 → AlreadyImported；其他错误 → failed
///
/// # 参数
/// - progress_every: 每创建多少条输出一次进度
pub async fn create_customers(
    store: &dyn MigrationStore,
    registry: &CustomerRegistry,
    progress_every: usize,
) -> CustomerResolution {
    let mut resolution = CustomerResolution::default();

    let mut existing: HashMap<String, String> = HashMap::new();
    match store.list_customers().await {
        Ok(customers) => {
            for customer in customers {
                existing.entry(customer.display_name).or_insert(customer.id);
            }
        }
        Err(e) => {
            // 读不到既有客户时退化为全部新建
            error!(error = %e, "读取既有客户失败");
        }
    }
    debug!(existing = existing.len(), "既有客户加载完成");

    for entry in registry.entries() {
        if let Some(id) = existing.get(&entry.code) {
            resolution.ids.insert(entry.code.clone(), id.clone());
            resolution
                .outcome
                .push_skipped(entry.code.clone(), SkipReason::ExistingCustomer);
            continue;
        }

        let new_customer = NewCustomer {
            display_name: entry.code.clone(),
            tier_code: entry.tier_code,
            active: true,
        };

        match store.create_customer(&new_customer).await {
            Ok(customer) => {
                resolution.ids.insert(entry.code.clone(), customer.id.clone());
                resolution.outcome.push_created(customer);

                let created = resolution.outcome.created.len();
                if progress_every > 0 && created % progress_every == 0 {
                    info!(created, "客户创建进度");
                }
            }
            Err(e) if e.is_duplicate() => {
                resolution
                    .outcome
                    .push_skipped(entry.code.clone(), SkipReason::AlreadyImported);
            }
            Err(e) => {
                error!(customer_code = %entry.code, error = %e, "客户创建失败");
                resolution.outcome.push_failed(
                    entry.code.clone(),
                    e,
                    serde_json::json!({ "code": entry.code, "tier": entry.tier_code }),
                );
            }
        }
    }

    info!(
        created = resolution.outcome.created.len(),
        reused = resolution.outcome.skipped_count(SkipReason::ExistingCustomer),
        failed = resolution.outcome.failed.len(),
        "客户创建完成"
    );
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::field_mapper::columns;
    use crate::importer::workbook::CellValue;

    fn row(code: Option<&str>, customer_type: Option<&str>) -> RawRecord {
        let mut values = HashMap::new();
        if let Some(code) = code {
            values.insert(
                columns::CUSTOMER_CODE.to_string(),
                CellValue::Text(code.to_string()),
            );
        }
        if let Some(t) = customer_type {
            values.insert(columns::CUSTOMER_TYPE.to_string(), CellValue::Text(t.to_string()));
        }
        RawRecord::new(2, values)
    }

    #[test]
    fn test_first_seen_classification_wins() {
        let air = vec![row(Some("C001"), Some("VIP"))];
        let sea = vec![row(Some("C001"), Some("ทั่วไป")), row(Some("C002"), None)];

        let registry = CustomerRegistry::from_records(air.iter().chain(sea.iter()));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("C001").unwrap().tier_code, TierCode::Vip);
        assert_eq!(registry.get("C002").unwrap().tier_code, TierCode::Regular);
    }

    #[test]
    fn test_registration_order_is_first_seen() {
        let rows = vec![
            row(Some("B"), None),
            row(None, Some("VIP")),
            row(Some("A"), Some("ลูกค้าประจำ")),
            row(Some("B"), Some("VIP2")),
        ];
        let registry = CustomerRegistry::from_records(&rows);

        let codes: Vec<&str> = registry.entries().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A"]);
        assert_eq!(registry.get("A").unwrap().tier_code, TierCode::Loyal);
    }

    #[test]
    fn test_numeric_codes_are_registered_as_text() {
        let mut values = HashMap::new();
        values.insert(columns::CUSTOMER_CODE.to_string(), CellValue::Number(1001.0));
        let rows = vec![RawRecord::new(2, values)];

        let registry = CustomerRegistry::from_records(&rows);
        assert!(registry.get("1001").is_some());
    }
}
