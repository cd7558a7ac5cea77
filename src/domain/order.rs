// ==========================================
// 代购业务数据迁移 - 订单领域模型
// ==========================================
// 对齐: schema.sql orders / order_item 表
// 红线: 每个 OrderItem 必须属于同一次运行创建的 Order
// 红线: sequence_number 在订单内从 1 连续编号
// ==========================================

use crate::domain::types::ShippingChannel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// NewOrder - 待创建订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: String,           // 生成的订单号（AIR2501-00001）
    pub customer_id: Option<String>,    // 客户身份（未解析时为空）
    pub shipping_channel: ShippingChannel,
    pub status: String,                 // processing / completed
    pub status_step: i32,               // 订单生命周期步骤
    pub origin: String,
    pub destination: String,
    pub estimated_cost: Option<f64>,    // 组内泰铢价格合计
}

/// 已持久化的订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(flatten)]
    pub fields: NewOrder,
}

// ==========================================
// NewOrderItem - 待创建订单明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewOrderItem {
    // ===== 归属 =====
    pub order_id: String,
    pub sequence_number: i32, // 订单内序号（1 起）
    pub customer_name: String, // 分组键（客户代码/客户名/unknown）

    // ===== 商品信息 =====
    pub item_code: Option<String>,    // 与收款台账关联的唯一键
    pub product_code: Option<String>,
    pub product_name: Option<String>, // 仅门店自提
    pub product_url: Option<String>,

    // ===== 价格 =====
    pub price_yen: Option<f64>,  // 源币种价格
    pub price_baht: Option<f64>, // 本币价格（含服务费）

    // ===== 状态 =====
    pub item_status: String,
    pub payment_status: Option<String>,
    pub status_step: i32,

    // ===== 物流与备注 =====
    pub shipping_round: Option<String>,
    pub remarks: Option<String>,
    pub click_date: Option<NaiveDateTime>,
}

/// 已持久化的订单明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    #[serde(flatten)]
    pub fields: NewOrderItem,
}
