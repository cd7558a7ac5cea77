// ==========================================
// 代购业务数据迁移 - 客户领域模型
// ==========================================
// 对齐: schema.sql customer 表
// 说明: 迁移只认源表客户代码，display_name 即客户代码
// ==========================================

use crate::domain::types::TierCode;
use serde::{Deserialize, Serialize};

/// 待创建的客户（身份由存储层分配）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub display_name: String,
    pub tier_code: TierCode,
    pub active: bool,
}

/// 已持久化的客户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub display_name: String,
    pub tier_code: TierCode,
    pub active: bool,
}
