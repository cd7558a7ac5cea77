// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、内存工作簿构建、标准测试工作簿
// ==========================================

#![allow(dead_code)]

use agency_import::config::MigrationSettings;
use agency_import::importer::{CellValue, MemoryWorkbook, SheetGrid};
use agency_import::SqliteMigrationStore;
use chrono::NaiveDate;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库（schema 由 SqliteMigrationStore 初始化）
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("临时路径非 UTF-8")?.to_string();

    SqliteMigrationStore::new(&db_path)?;

    Ok((temp_file, db_path))
}

/// 打开测试存储
pub fn open_store(db_path: &str) -> SqliteMigrationStore {
    SqliteMigrationStore::new(db_path).expect("Failed to open store")
}

/// 测试运行日期（订单号前缀 2501）
pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
}

// ==========================================
// SheetBuilder - 工作表矩阵构建器
// ==========================================
#[derive(Default)]
pub struct SheetBuilder {
    rows: SheetGrid,
}

impl SheetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加整行空白（模拟表头上方的标题区）
    pub fn blank_row(mut self) -> Self {
        self.rows.push(vec![CellValue::Empty]);
        self
    }

    /// 追加文本行（空字符串写为 Empty）
    pub fn row(mut self, cells: &[&str]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|c| {
                    if c.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::from(*c)
                    }
                })
                .collect(),
        );
        self
    }

    /// 追加任意单元格行
    pub fn cells(mut self, cells: Vec<CellValue>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn build(self) -> SheetGrid {
        self.rows
    }
}

// ==========================================
// 标准测试工作簿
// ==========================================
// 空运: C001 x2, C002 x1, 无客户 x1 → 3 个订单 4 条明细
// 海运: C001, C003 → 2 个订单
// 门店: C004, คุณบี x2 → 2 个订单 3 条明细
// 收款: 3 条可入账，其余各有一个跳过原因

pub fn air_sheet() -> SheetGrid {
    SheetBuilder::new()
        .blank_row()
        .row(&[
            "รหัสลูกค้า",
            "ประเภทลูกค้า",
            "Item Code",
            "รหัสสินค้า",
            "ราคา¥",
            "ราคาสินค้ารวมค่าบริการ",
            "สถานะของ",
            "วัน เดือน ปี",
        ])
        .row(&["C001", "VIP", "A-001", "P1", "1000", "260", "สั่งซื้อจาก JP", "15/01/2025"])
        .cells(vec![
            CellValue::from("C002"),
            CellValue::from("ลูกค้าประจำ"),
            CellValue::from("A-002"),
            CellValue::from("P2"),
            CellValue::from("2,000"),
            CellValue::Number(500.0),
            CellValue::from("ของถึงไทย"),
            CellValue::Number(45000.0),
        ])
        .row(&["C001", "VIP", "A-003", "P3", "500", "130", "", ""])
        .row(&["", "", "A-004", "P4", "100", "26", "", ""])
        .build()
}

pub fn sea_sheet() -> SheetGrid {
    SheetBuilder::new()
        .row(&["รหัสลูกค้า", "ประเภทลูกค้า", "Item Code", "ราคาสินค้ารวมบริการ"])
        .row(&["C001", "ทั่วไป", "S-001", "900"])
        .row(&["C003", "VIP2", "S-002", "1,200"])
        .build()
}

pub fn pickup_sheet() -> SheetGrid {
    SheetBuilder::new()
        .row(&["รหัสลูกค้า", "ชื่อลูกค้า", "ชื่อสินค้า", "ราคาเยน", "ราคา¥", "ราคาบาท", "Item Code"])
        .row(&["C004", "", "กระเป๋า", "0", "3000", "800", "P-001"])
        .row(&["", "คุณบี", "หมวก", "1500", "", "400", ""])
        .row(&["", "คุณบี", "เสื้อ", "2000", "", "550", ""])
        .build()
}

pub fn payment_sheet() -> SheetGrid {
    SheetBuilder::new()
        .row(&[
            "Item Code",
            "ยอดเงินเข้า",
            "ยอดจ่ายครั้งที่ 1",
            "ประเภทการจ่าย (มัดจำ/เต็ม/รวมค่าส่ง)",
            "วิธีการชำระเงิน (ธนาคาร)",
            "วันที่",
            "แอดมิน",
        ])
        .row(&["A-001", "500", "", "มัดจำ", "KBank", "20/01/2025", "admin01"])
        .row(&["A-001", "", "1,200", "รวมค่าส่ง", "", "", ""])
        .row(&["S-002", "1200", "", "เต็ม", "SCB", "", "admin02"])
        .row(&["", "300", "", "", "", "", ""])
        .row(&["X-999", "100", "", "", "", "", ""])
        .row(&["P-001", "800", "", "", "", "", ""])
        .row(&["A-002", "", "", "มัดจำ", "", "", ""])
        .row(&["A-003", "0", "-5", "", "", "", ""])
        .row(&["", "", "", "", "", "", ""])
        .build()
}

/// 使用默认工作表名构建标准测试工作簿
pub fn sample_workbook() -> MemoryWorkbook {
    let sheets = MigrationSettings::default().sheets;
    MemoryWorkbook::new()
        .with_sheet(&sheets.air, air_sheet())
        .with_sheet(&sheets.sea, sea_sheet())
        .with_sheet(&sheets.pickup, pickup_sheet())
        .with_sheet(&sheets.payments, payment_sheet())
}
