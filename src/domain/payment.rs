// ==========================================
// 代购业务数据迁移 - 收款领域模型
// ==========================================
// 对齐: schema.sql payment 表
// 红线: amount 必须 > 0
// 红线: order_item_id 必须指向已创建的订单明细
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 台账导入视为已对账
pub const PAYMENT_STATUS_VERIFIED: &str = "verified";

/// 台账未填付款方式时的默认值
pub const DEFAULT_PAYMENT_METHOD: &str = "bank_transfer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub order_item_id: String,
    pub installment_number: i32,
    pub installment_name: String,
    pub amount: f64,
    pub slip_amount: f64,
    pub status: String,
    pub payment_method: String,
    pub paid_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub verified_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(flatten)]
    pub fields: NewPayment,
}
