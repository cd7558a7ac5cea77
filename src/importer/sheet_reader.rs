// ==========================================
// 代购业务数据迁移 - 工作表读取器
// ==========================================
// 职责: 原始矩阵 → 按列名取值的行记录序列
// 模式:
// - read_detected: 表头位置不固定（订单类工作表）
// - read_with_header: 首行即表头（收款台账）
// ==========================================

use crate::importer::workbook::{CellValue, SheetGrid};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// 少于该行数的工作表视为空表
const MIN_SHEET_ROWS: usize = 3;

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// RawRecord - 行记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 工作表中的行号（1 起，便于对照 Excel）
    pub row_number: usize,
    values: HashMap<String, CellValue>,
}

impl RawRecord {
    pub fn new(row_number: usize, values: HashMap<String, CellValue>) -> Self {
        Self { row_number, values }
    }

    /// 按列名取值，列不存在时返回 Empty
    pub fn get(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// 列名集合（无序）
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 转为 JSON（记录失败行原始数据用）
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.values {
            let json = match value {
                CellValue::Empty => Value::Null,
                CellValue::Number(n) => serde_json::Number::from_f64(*n)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                CellValue::Bool(b) => Value::Bool(*b),
                other => Value::String(other.to_string()),
            };
            map.insert(key.clone(), json);
        }
        Value::Object(map)
    }
}

fn row_has_content(row: &[CellValue]) -> bool {
    row.iter().any(|cell| !cell.is_blank())
}

/// 表头单元格 → 列名（空白单元格使用 "Column<i>" 占位）
fn header_keys(header_row: &[CellValue]) -> Vec<String> {
    header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let text = cell.to_string();
            let trimmed = text.trim();
            if cell.is_blank() {
                format!("Column{}", i)
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

/// 以 headers 为列，将表头之后的行转为记录，跳过整行为空的行
fn collect_records(grid: &SheetGrid, header_index: usize, headers: &[String]) -> Vec<RawRecord> {
    let mut records = Vec::new();

    for (row_idx, row) in grid.iter().enumerate().skip(header_index + 1) {
        let mut values = HashMap::with_capacity(headers.len());
        let mut has_data = false;

        for (col_idx, header) in headers.iter().enumerate() {
            let cell = row.get(col_idx).cloned().unwrap_or(CellValue::Empty);
            if !cell.is_blank() {
                has_data = true;
            }
            values.insert(header.clone(), cell);
        }

        if has_data {
            records.push(RawRecord::new(row_idx + 1, values));
        }
    }

    records
}

/// 读取表头位置不固定的工作表
///
/// # 规则
/// 1. 少于 3 行 → 空
/// 2. 第一个含非空单元格的行为表头
/// 3. 列名 = 单元格去空白文本，空白列用 "Column<i>"
/// 4. 其余行中至少一个非空值的行成为记录，保持源顺序
pub fn read_detected(sheet_name: &str, grid: &SheetGrid) -> Vec<RawRecord> {
    if grid.len() < MIN_SHEET_ROWS {
        return Vec::new();
    }

    let header_index = match grid.iter().position(|row| row_has_content(row)) {
        Some(idx) => idx,
        None => return Vec::new(),
    };

    let headers = header_keys(&grid[header_index]);
    debug!(
        sheet = sheet_name,
        header_row = header_index,
        columns = %headers.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
        "表头定位完成"
    );

    collect_records(grid, header_index, &headers)
}

/// 读取首行即表头的工作表（无 3 行下限）
pub fn read_with_header(grid: &SheetGrid) -> Vec<RawRecord> {
    match grid.first() {
        Some(header_row) => {
            let headers = header_keys(header_row);
            collect_records(grid, 0, &headers)
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_detect_header_after_blank_rows() {
        let grid = vec![
            vec![CellValue::Empty, CellValue::Empty],
            vec![CellValue::Empty, t("")],
            vec![t(" รหัสลูกค้า "), t("Item Code")],
            vec![t("C001"), t("IC-1")],
            vec![CellValue::Empty, CellValue::Empty],
            vec![t("C002"), CellValue::Empty],
        ];

        let records = read_detected("air", &grid);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("รหัสลูกค้า"), &t("C001"));
        assert_eq!(records[0].get("Item Code"), &t("IC-1"));
        assert_eq!(records[0].row_number, 4);
        assert_eq!(records[1].get("รหัสลูกค้า"), &t("C002"));
        assert_eq!(records[1].get("Item Code"), &CellValue::Empty);
    }

    #[test]
    fn test_blank_header_cells_get_placeholder() {
        let grid = vec![
            vec![t("A"), CellValue::Empty, t("C")],
            vec![t("1"), t("2"), t("3")],
            vec![t("4"), t("5")],
        ];

        let records = read_detected("s", &grid);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Column1"), &t("2"));
        // 短行缺失单元格补 Empty
        assert_eq!(records[1].get("C"), &CellValue::Empty);
    }

    #[test]
    fn test_fewer_than_three_rows_is_empty() {
        let grid = vec![vec![t("A")], vec![t("1")]];
        assert!(read_detected("s", &grid).is_empty());
        assert!(read_detected("s", &Vec::new()).is_empty());
    }

    #[test]
    fn test_read_with_header_has_no_row_minimum() {
        let grid = vec![vec![t("Item Code"), t("ยอดเงินเข้า")], vec![t("IC-1"), t("500")]];
        let records = read_with_header(&grid);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("ยอดเงินเข้า"), &t("500"));
    }

    #[test]
    fn test_missing_column_reads_empty() {
        let grid = vec![vec![t("A")], vec![t("x")]];
        let records = read_with_header(&grid);
        assert_eq!(records[0].get("ไม่มีคอลัมน์"), &CellValue::Empty);
    }

    #[test]
    fn test_to_json() {
        let grid = vec![
            vec![t("code"), t("amount")],
            vec![t("IC-1"), CellValue::Number(12.5)],
        ];
        let json = read_with_header(&grid)[0].to_json();
        assert_eq!(json["code"], "IC-1");
        assert_eq!(json["amount"], 12.5);
    }
}
