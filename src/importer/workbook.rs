// ==========================================
// 代购业务数据迁移 - 工作簿读取
// ==========================================
// 阶段 0: 文件读取，输出“原始单元格矩阵”
// 支持: Excel (.xlsx)；测试使用内存工作簿
// 约定: 缺失单元格一律为 CellValue::Empty（不存在 undefined）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    /// 空值判定: Empty 或空字符串
    ///
    /// 与源数据导出口径一致，仅含空格的文本不视为空
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            // f64 的 Display 对整数不输出小数点（12500.0 → "12500"）
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            // 日期格式单元格保留序列号，由 ValueNormalizer 统一换算
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

/// 工作表原始矩阵（行 → 单元格）
pub type SheetGrid = Vec<Vec<CellValue>>;

// ==========================================
// WorkbookSource Trait
// ==========================================
// 用途: 屏蔽工作簿来源（xlsx 文件 / 内存）
// 实现者: XlsxWorkbook, MemoryWorkbook
pub trait WorkbookSource {
    /// 工作表名称列表（按工作簿顺序）
    fn sheet_names(&self) -> Vec<String>;

    /// 读取指定工作表
    ///
    /// # 返回
    /// - Ok(Some(grid)): 工作表存在
    /// - Ok(None): 工作表不存在
    /// - Err: 解析失败
    fn read_sheet(&mut self, name: &str) -> ImportResult<Option<SheetGrid>>;
}

// ==========================================
// XlsxWorkbook - calamine 实现
// ==========================================
pub struct XlsxWorkbook {
    inner: Xlsx<BufReader<File>>,
}

impl XlsxWorkbook {
    /// 打开 xlsx 文件
    pub fn open<P: AsRef<Path>>(file_path: P) -> ImportResult<Self> {
        let path = file_path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let inner: Xlsx<_> = open_workbook(path)?;
        Ok(Self { inner })
    }
}

impl WorkbookSource for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> ImportResult<Option<SheetGrid>> {
        if !self.inner.sheet_names().iter().any(|n| n == name) {
            return Ok(None);
        }

        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e| ImportError::SheetReadError {
                sheet: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(range_to_grid(&range)))
    }
}

/// calamine Range → 以 A1 为原点的矩阵
///
/// calamine 的 Range 从第一个非空单元格开始，这里补齐前导空行/空列，
/// 保证表头定位与 "Column<i>" 占位列号与工作表一致
fn range_to_grid(range: &Range<Data>) -> SheetGrid {
    let (start_row, start_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return Vec::new(),
    };

    let mut grid: SheetGrid = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col];
        cells.extend(row.iter().map(CellValue::from));
        grid.push(cells);
    }
    grid
}

// ==========================================
// MemoryWorkbook - 内存工作簿
// ==========================================
/// 以内存矩阵构造的工作簿（测试与数据修复脚本使用）
#[derive(Debug, Default, Clone)]
pub struct MemoryWorkbook {
    order: Vec<String>,
    sheets: HashMap<String, SheetGrid>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加（或替换）一个工作表
    pub fn with_sheet(mut self, name: &str, grid: SheetGrid) -> Self {
        if !self.sheets.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.sheets.insert(name.to_string(), grid);
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn read_sheet(&mut self, name: &str) -> ImportResult<Option<SheetGrid>> {
        Ok(self.sheets.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = XlsxWorkbook::open("non_existent.xlsx");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_open_rejects_other_extensions() {
        let temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let result = XlsxWorkbook::open(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_cell_from_calamine_data() {
        assert_eq!(CellValue::from(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
        assert_eq!(
            CellValue::from(&Data::String("VIP".to_string())),
            CellValue::Text("VIP".to_string())
        );
    }

    #[test]
    fn test_cell_display_integer_number() {
        assert_eq!(CellValue::Number(12500.0).to_string(), "12500");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_range_to_grid_pads_leading_rows_and_columns() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Item Code".to_string()));
        range.set_value((3, 1), Data::String("IC-1".to_string()));

        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 4);
        assert!(grid[0].is_empty());
        assert_eq!(grid[2][0], CellValue::Empty);
        assert_eq!(grid[2][1], CellValue::Text("Item Code".to_string()));
        assert_eq!(grid[3][1], CellValue::Text("IC-1".to_string()));
    }

    #[test]
    fn test_memory_workbook_missing_sheet() {
        let mut workbook = MemoryWorkbook::new().with_sheet("เงินเข้า", vec![]);
        assert_eq!(workbook.sheet_names(), vec!["เงินเข้า".to_string()]);
        assert!(workbook.read_sheet("ไม่มี").unwrap().is_none());
    }
}
