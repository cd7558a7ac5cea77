// ==========================================
// 代购业务数据迁移 - 客户等级初始化
// ==========================================
// 固定 4 个等级，按 tier_code 幂等 upsert
// 重复执行不增加行数
// ==========================================

use crate::domain::{Tier, TierCode};
use crate::importer::stage::StageOutcome;
use crate::repository::MigrationStore;
use tracing::{error, info};

/// 固定等级目录（按 sort_order）
pub fn tier_catalogue() -> Vec<Tier> {
    vec![
        Tier {
            code: TierCode::Regular,
            display_name: "Regular".to_string(),
            localized_name: "ทั่วไป".to_string(),
            display_color: "#6B7280".to_string(),
            icon: "user".to_string(),
            exchange_rate: 0.26,
            min_spend: 0.0,
            max_spend: Some(10_000.0),
            sort_order: 1,
            active: true,
        },
        Tier {
            code: TierCode::Loyal,
            display_name: "Loyal Customer".to_string(),
            localized_name: "ลูกค้าประจำ".to_string(),
            display_color: "#3B82F6".to_string(),
            icon: "heart".to_string(),
            exchange_rate: 0.25,
            min_spend: 10_000.0,
            max_spend: Some(50_000.0),
            sort_order: 2,
            active: true,
        },
        Tier {
            code: TierCode::Vip,
            display_name: "VIP".to_string(),
            localized_name: "VIP".to_string(),
            display_color: "#8B5CF6".to_string(),
            icon: "star".to_string(),
            exchange_rate: 0.25,
            min_spend: 50_000.0,
            max_spend: Some(100_000.0),
            sort_order: 3,
            active: true,
        },
        Tier {
            code: TierCode::Vip2,
            display_name: "VIP2".to_string(),
            localized_name: "VIP2".to_string(),
            display_color: "#F59E0B".to_string(),
            icon: "crown".to_string(),
            exchange_rate: 0.24,
            min_spend: 100_000.0,
            max_spend: None,
            sort_order: 4,
            active: true,
        },
    ]
}

/// 幂等写入等级目录
pub async fn seed_tiers(store: &dyn MigrationStore) -> StageOutcome<TierCode> {
    let mut outcome = StageOutcome::new();

    for tier in tier_catalogue() {
        match store.upsert_tier(&tier).await {
            Ok(()) => outcome.push_created(tier.code),
            Err(e) => {
                error!(tier_code = %tier.code, error = %e, "等级写入失败");
                outcome.push_failed(tier.code.as_str(), e, serde_json::Value::Null);
            }
        }
    }

    info!(seeded = outcome.created.len(), "客户等级初始化完成");
    outcome
}
