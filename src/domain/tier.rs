// ==========================================
// 代购业务数据迁移 - 客户等级领域模型
// ==========================================
// 对齐: schema.sql customer_tier 表
// 生命周期: 每次运行幂等 upsert，迁移流程从不删除
// ==========================================

use crate::domain::types::TierCode;
use serde::{Deserialize, Serialize};

// ==========================================
// Tier - 客户等级
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    // ===== 主键 =====
    pub code: TierCode, // 等级代码（自然键）

    // ===== 展示信息 =====
    pub display_name: String,   // 英文名称
    pub localized_name: String, // 泰文名称
    pub display_color: String,  // 前端颜色
    pub icon: String,           // 前端图标

    // ===== 业务参数 =====
    pub exchange_rate: f64,      // 日元→泰铢汇率
    pub min_spend: f64,          // 累计消费下限（含）
    pub max_spend: Option<f64>,  // 累计消费上限（None = 无上限）

    // ===== 排序与状态 =====
    pub sort_order: i32,
    pub active: bool,
}
