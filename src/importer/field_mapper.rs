// ==========================================
// 代购业务数据迁移 - 字段映射器
// ==========================================
// 职责: 源工作表列名 → 领域字段 + 类型转换
// 说明: 列名为源表固定的泰文/英文自由文本，不做推断
// ==========================================

use crate::domain::ShippingChannel;
use crate::importer::sheet_reader::RawRecord;
use crate::importer::value_normalizer::{clean_text, first_positive, parse_date, parse_number};
use crate::importer::workbook::CellValue;
use chrono::NaiveDateTime;

// ==========================================
// 源表列名
// ==========================================
pub mod columns {
    // ===== 客户 =====
    pub const CUSTOMER_CODE: &str = "รหัสลูกค้า";
    pub const CUSTOMER_TYPE: &str = "ประเภทลูกค้า";
    pub const CUSTOMER_NAME: &str = "ชื่อลูกค้า";

    // ===== 空运/海运明细 =====
    pub const ITEM_CODE: &str = "Item Code";
    pub const PRODUCT_CODE: &str = "รหัสสินค้า";
    pub const PRODUCT_URL: &str = "ลิ้งค์สินค้า";
    pub const PRICE_YEN: &str = "ราคา¥";
    pub const PRICE_BAHT_AIR: &str = "ราคาสินค้ารวมค่าบริการ";
    pub const PRICE_BAHT_SEA: &str = "ราคาสินค้ารวมบริการ";
    pub const ITEM_STATUS: &str = "สถานะของ";
    pub const SHIPPING_ROUND: &str = "ส่งกลับไทยรอบวันที่";
    pub const REMARKS: &str = "หมายเหตุ";
    pub const CLICK_DATE: &str = "วัน เดือน ปี";

    // ===== 门店自提明细 =====
    pub const PRODUCT_NAME: &str = "ชื่อสินค้า";
    pub const PRICE_YEN_STORE: &str = "ราคาเยน";
    pub const PRICE_BAHT_STORE: &str = "ราคาบาท";

    // ===== 收款台账 =====
    pub const PAYMENT_AMOUNT: &str = "ยอดเงินเข้า";
    pub const FIRST_INSTALLMENT_AMOUNT: &str = "ยอดจ่ายครั้งที่ 1";
    pub const PAYMENT_TYPE: &str = "ประเภทการจ่าย (มัดจำ/เต็ม/รวมค่าส่ง)";
    pub const PAYMENT_METHOD: &str = "วิธีการชำระเงิน (ธนาคาร)";
    pub const PAID_AT: &str = "วันที่";
    pub const VERIFIED_BY: &str = "แอดมิน";
}

/// 未填客户类型时的默认值
pub const DEFAULT_CUSTOMER_TYPE: &str = "ทั่วไป";

/// 无客户代码时的分组键
pub const UNKNOWN_CUSTOMER_KEY: &str = "unknown";

/// 跨境明细未填状态时的默认值
pub const DEFAULT_ITEM_STATUS: &str = "pending";

/// 门店自提明细的固定状态
pub const PICKUP_ITEM_STATUS: &str = "completed";

// ==========================================
// 明细状态 → 生命周期步骤
// ==========================================
/// 已知状态文本对应的步骤，未知文本返回 None
pub fn status_step_for(item_status: &str) -> Option<i32> {
    match item_status.trim() {
        "รับออเดอร์" => Some(1),
        "ชำระเงินงวดแรก" => Some(2),
        "สั่งซื้อจาก JP" => Some(3),
        "ของถึงโกดัง JP" => Some(4),
        "ส่งออกจาก JP" => Some(5),
        "ของถึงไทย" => Some(6),
        "ของยังไม่เข้าบ้าน" | "กำลังจัดส่ง" => Some(7),
        "ของเข้าบ้านแล้ว" | "ส่งมอบสำเร็จ" => Some(8),
        _ => None,
    }
}

// ==========================================
// CustomerRef - 订单行上的客户信息
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRef {
    pub code: Option<String>,
    pub customer_type: String,
}

/// 提取客户代码与客户类型（类型缺省为 ทั่วไป）
pub fn map_customer_ref(record: &RawRecord) -> CustomerRef {
    CustomerRef {
        code: clean_text(record.get(columns::CUSTOMER_CODE)),
        customer_type: clean_text(record.get(columns::CUSTOMER_TYPE))
            .unwrap_or_else(|| DEFAULT_CUSTOMER_TYPE.to_string()),
    }
}

/// 订单分组键
///
/// - 空运/海运: 客户代码，否则 unknown
/// - 门店自提: 客户代码 → 客户名 → unknown
pub fn group_key(channel: ShippingChannel, record: &RawRecord) -> String {
    let code = clean_text(record.get(columns::CUSTOMER_CODE));
    let key = match channel {
        ShippingChannel::Pickup => {
            code.or_else(|| clean_text(record.get(columns::CUSTOMER_NAME)))
        }
        _ => code,
    };
    key.unwrap_or_else(|| UNKNOWN_CUSTOMER_KEY.to_string())
}

// ==========================================
// ItemDraft - 订单明细草稿（未分配订单与序号）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemDraft {
    pub item_code: Option<String>,
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    pub product_url: Option<String>,
    pub price_yen: Option<f64>,
    pub price_baht: Option<f64>,
    pub item_status: String,
    pub payment_status: Option<String>,
    pub status_step: i32,
    pub shipping_round: Option<String>,
    pub remarks: Option<String>,
    pub click_date: Option<NaiveDateTime>,
}

/// 按渠道映射订单明细字段
///
/// # 参数
/// - channel: 运输渠道（决定列集合）
/// - default_step: 渠道默认生命周期步骤
pub fn map_item_draft(channel: ShippingChannel, record: &RawRecord, default_step: i32) -> ItemDraft {
    match channel {
        ShippingChannel::Air | ShippingChannel::Sea => {
            let baht_column = if channel == ShippingChannel::Air {
                columns::PRICE_BAHT_AIR
            } else {
                columns::PRICE_BAHT_SEA
            };
            let item_status = clean_text(record.get(columns::ITEM_STATUS))
                .unwrap_or_else(|| DEFAULT_ITEM_STATUS.to_string());
            let status_step = status_step_for(&item_status).unwrap_or(default_step);

            ItemDraft {
                item_code: clean_text(record.get(columns::ITEM_CODE)),
                product_code: clean_text(record.get(columns::PRODUCT_CODE)),
                product_name: None,
                product_url: clean_text(record.get(columns::PRODUCT_URL)),
                price_yen: parse_number(record.get(columns::PRICE_YEN)),
                price_baht: parse_number(record.get(baht_column)),
                item_status,
                payment_status: Some("pending".to_string()),
                status_step,
                shipping_round: clean_text(record.get(columns::SHIPPING_ROUND)),
                remarks: clean_text(record.get(columns::REMARKS)),
                click_date: parse_date(record.get(columns::CLICK_DATE)),
            }
        }
        ShippingChannel::Pickup => ItemDraft {
            // 门店自提无跨境跟踪，不带 Item Code
            item_code: None,
            product_code: None,
            product_name: clean_text(record.get(columns::PRODUCT_NAME)),
            product_url: None,
            price_yen: pickup_price_yen(record),
            price_baht: parse_number(record.get(columns::PRICE_BAHT_STORE)),
            item_status: PICKUP_ITEM_STATUS.to_string(),
            payment_status: Some("paid".to_string()),
            status_step: default_step,
            shipping_round: None,
            remarks: clean_text(record.get(columns::REMARKS)),
            click_date: None,
        },
    }
}

/// 门店日元价: ราคาเยน 为空或 0 时回退 ราคา¥
fn pickup_price_yen(record: &RawRecord) -> Option<f64> {
    parse_number(record.get(columns::PRICE_YEN_STORE))
        .filter(|n| *n != 0.0)
        .or_else(|| parse_number(record.get(columns::PRICE_YEN)))
}

// ==========================================
// PaymentRow - 收款台账行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    pub item_code: Option<String>,
    /// ยอดเงินเข้า → ยอดจ่ายครั้งที่ 1 中第一个正数
    pub amount: Option<f64>,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub verified_by: Option<String>,
}

pub fn map_payment_row(record: &RawRecord) -> PaymentRow {
    let primary: &CellValue = record.get(columns::PAYMENT_AMOUNT);
    let secondary: &CellValue = record.get(columns::FIRST_INSTALLMENT_AMOUNT);

    PaymentRow {
        item_code: clean_text(record.get(columns::ITEM_CODE)),
        amount: first_positive(&[primary, secondary]),
        payment_type: clean_text(record.get(columns::PAYMENT_TYPE)),
        payment_method: clean_text(record.get(columns::PAYMENT_METHOD)),
        paid_at: parse_date(record.get(columns::PAID_AT)),
        notes: clean_text(record.get(columns::REMARKS)),
        verified_by: clean_text(record.get(columns::VERIFIED_BY)),
    }
}
