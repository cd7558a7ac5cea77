// ==========================================
// 代购业务数据迁移 - 领域类型定义
// ==========================================
// 运输渠道 / 客户等级 / 分期类型
// 序列化格式: 小写 snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 运输渠道 (Shipping Channel)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingChannel {
    Air,    // 空运
    Sea,    // 海运
    Pickup, // 门店自提
}

impl ShippingChannel {
    /// 全部渠道，按导入顺序排列
    pub const ALL: [ShippingChannel; 3] = [
        ShippingChannel::Air,
        ShippingChannel::Sea,
        ShippingChannel::Pickup,
    ];

    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingChannel::Air => "air",
            ShippingChannel::Sea => "sea",
            ShippingChannel::Pickup => "pickup",
        }
    }

    /// 数据库存储值 → 渠道
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "air" => Some(ShippingChannel::Air),
            "sea" => Some(ShippingChannel::Sea),
            "pickup" => Some(ShippingChannel::Pickup),
            _ => None,
        }
    }

    /// 订单号前缀
    pub fn order_prefix(&self) -> &'static str {
        match self {
            ShippingChannel::Air => "AIR",
            ShippingChannel::Sea => "SEA",
            ShippingChannel::Pickup => "STR",
        }
    }

    /// 是否为跨境运输渠道（有物流跟踪生命周期）
    pub fn is_cross_border(&self) -> bool {
        !matches!(self, ShippingChannel::Pickup)
    }
}

impl fmt::Display for ShippingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 客户等级代码 (Tier Code)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierCode {
    Regular, // ทั่วไป
    Loyal,   // ลูกค้าประจำ
    Vip,     // VIP
    Vip2,    // VIP2
}

impl TierCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierCode::Regular => "regular",
            TierCode::Loyal => "loyal",
            TierCode::Vip => "vip",
            TierCode::Vip2 => "vip2",
        }
    }

    /// 源表“ประเภทลูกค้า”自由文本 → 等级代码
    ///
    /// 未登记的文本一律归为 regular
    pub fn from_customer_type(label: &str) -> Self {
        match label.trim() {
            "ทั่วไป" => TierCode::Regular,
            "VIP" => TierCode::Vip,
            "VIP2" => TierCode::Vip2,
            "ลูกค้าประจำ" => TierCode::Loyal,
            _ => TierCode::Regular,
        }
    }

    /// 数据库存储值 → 等级代码
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "regular" => Some(TierCode::Regular),
            "loyal" => Some(TierCode::Loyal),
            "vip" => Some(TierCode::Vip),
            "vip2" => Some(TierCode::Vip2),
            _ => None,
        }
    }
}

impl fmt::Display for TierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 分期类型 (Installment Kind)
// ==========================================
// 由台账“ประเภทการจ่าย”自由文本判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentKind {
    Deposit,           // มัดจำ
    IncludingShipping, // รวมค่าส่ง
    PaidInFull,        // ชำระเต็มจำนวน
}

impl InstallmentKind {
    /// 按顺序做子串匹配: มัดจำ → ค่าส่ง → เต็ม，均未命中视为全额
    pub fn classify(payment_type: Option<&str>) -> Self {
        match payment_type {
            Some(text) if text.contains("มัดจำ") => InstallmentKind::Deposit,
            Some(text) if text.contains("ค่าส่ง") => InstallmentKind::IncludingShipping,
            _ => InstallmentKind::PaidInFull,
        }
    }

    /// 分期序号（1 起）
    pub fn number(&self) -> i32 {
        match self {
            InstallmentKind::Deposit | InstallmentKind::PaidInFull => 1,
            InstallmentKind::IncludingShipping => 2,
        }
    }

    /// 分期名称（落库值）
    pub fn display_name(&self) -> &'static str {
        match self {
            InstallmentKind::Deposit => "มัดจำ",
            InstallmentKind::IncludingShipping => "รวมค่าส่ง",
            InstallmentKind::PaidInFull => "ชำระเต็มจำนวน",
        }
    }
}

impl fmt::Display for InstallmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
