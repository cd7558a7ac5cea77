// ==========================================
// 代购业务数据迁移 - 值标准化
// ==========================================
// 职责: 原始单元格 → 规范日期 / 数值 / 文本
// 红线: 全部为纯函数，解析失败返回 None，绝不 panic
// ==========================================

use crate::importer::workbook::CellValue;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

/// 表格序列号纪元与 1970-01-01 的天数差
pub const SPREADSHEET_EPOCH_OFFSET_DAYS: f64 = 25569.0;

/// 每天毫秒数
const MILLIS_PER_DAY: f64 = 86_400.0 * 1000.0;

/// 通用日期格式（依次尝试）
const GENERIC_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const GENERIC_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// 解析日期
///
/// # 规则
/// - 已是日期 → 原样返回
/// - 数值 → 表格序列号: (n - 25569) × 86400 × 1000 毫秒
/// - 文本 DD/MM/YYYY → 按位置解析；否则尝试通用格式
/// - 空值 / 0 / 布尔 / 无法解析 → None
pub fn parse_date(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => serial_to_datetime(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

/// 表格序列号 → 日期时间（UTC 口径）
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial == 0.0 {
        return None;
    }

    let millis = ((serial - SPREADSHEET_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }

    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // DD/MM/YYYY
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() == 3 {
        let day = leading_int(parts[0]);
        let month = leading_int(parts[1]);
        let year = leading_int(parts[2]);
        if let (Some(day), Some(month), Some(year)) = (day, month, year) {
            if let Some(date) = rolled_date(year, month, day) {
                return date.and_hms_opt(0, 0, 0);
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in GENERIC_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in GENERIC_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// 按日历进位构造日期: 越界的月、日顺延到后续月份（31/02 → 03/03）
fn rolled_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let months = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let offset = day.checked_sub(1)?;
    if offset >= 0 {
        first.checked_add_days(Days::new(offset.unsigned_abs()))
    } else {
        first.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}

/// 解析前导整数（" 05abc" → 5），无数字时返回 None
fn leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// 解析数值
///
/// # 规则
/// - 空值 / 空字符串 → None
/// - 去除千分位逗号后取前导浮点数（"1500 บาท" → 1500）
/// - 无数字前缀 / NaN → None
pub fn parse_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) if n.is_nan() => None,
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) if s.is_empty() => None,
        CellValue::Text(s) => parse_number_text(&s.replace(',', "")),
        CellValue::Bool(_) | CellValue::Date(_) => None,
    }
}

fn parse_number_text(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            has_digits = has_digits || frac_end > frac_start;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }

    // 指数部分（1.2e3）
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'-' || bytes[exp_end] == b'+') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    trimmed[..end].parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// 清洗文本: 去首尾空白，空串 → None
///
/// 数值单元格按整数/小数的自然写法转为文本（12500.0 → "12500"）
pub fn clean_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        other => {
            let text = other.to_string();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
    }
}

/// 取第一个正数（用于金额回退链）
pub fn first_positive(values: &[&CellValue]) -> Option<f64> {
    values
        .iter()
        .filter_map(|v| parse_number(v))
        .find(|n| *n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_parse_date_serial() {
        let expected = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(45000 - 25569);

        assert_eq!(parse_date(&CellValue::Number(45000.0)), Some(expected));
        assert_eq!(expected.date(), NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
    }

    #[test]
    fn test_parse_date_serial_with_time_fraction() {
        let dt = parse_date(&CellValue::Number(45000.5)).unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn test_parse_date_dd_mm_yyyy() {
        let dt = parse_date(&text("05/03/2025")).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_date_dd_mm_yyyy_rolls_over() {
        let date = |s: &str| parse_date(&text(s)).unwrap().date();
        assert_eq!(date("31/02/2025"), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(date("05/13/2025"), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(date("00/03/2024"), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_parse_date_generic_formats() {
        assert_eq!(
            parse_date(&text("2025-01-20")).unwrap().date(),
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
        );
        assert_eq!(
            parse_date(&text("2025-01-20T08:30:00Z"))
                .unwrap()
                .format("%H:%M")
                .to_string(),
            "08:30"
        );
    }

    #[test]
    fn test_parse_date_invalid_returns_none() {
        assert_eq!(parse_date(&text("ยังไม่ระบุ")), None);
        assert_eq!(parse_date(&text("")), None);
        assert_eq!(parse_date(&CellValue::Empty), None);
        assert_eq!(parse_date(&CellValue::Number(0.0)), None);
        assert_eq!(parse_date(&CellValue::Number(f64::NAN)), None);
        assert_eq!(parse_date(&CellValue::Bool(true)), None);
    }

    #[test]
    fn test_parse_date_passthrough() {
        let dt = NaiveDate::from_ymd_opt(2024, 12, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(parse_date(&CellValue::Date(dt)), Some(dt));
    }

    #[test]
    fn test_parse_number_thousands_separator() {
        assert_eq!(parse_number(&text("12,500")), Some(12500.0));
        assert_eq!(parse_number(&text("1,234,567.89")), Some(1234567.89));
        assert_eq!(parse_number(&CellValue::Number(42.0)), Some(42.0));
    }

    #[test]
    fn test_parse_number_empty_and_garbage() {
        assert_eq!(parse_number(&text("")), None);
        assert_eq!(parse_number(&CellValue::Empty), None);
        assert_eq!(parse_number(&text("ไม่มี")), None);
        assert_eq!(parse_number(&text("NaN")), None);
        assert_eq!(parse_number(&text("inf")), None);
        assert_eq!(parse_number(&CellValue::Bool(false)), None);
    }

    #[test]
    fn test_parse_number_leading_prefix() {
        assert_eq!(parse_number(&text("1500 บาท")), Some(1500.0));
        assert_eq!(parse_number(&text(" -20.5")), Some(-20.5));
        assert_eq!(parse_number(&text(".5")), Some(0.5));
        assert_eq!(parse_number(&text("3.")), Some(3.0));
        assert_eq!(parse_number(&text("1e3")), Some(1000.0));
        assert_eq!(parse_number(&text("-")), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(&text("  C001 ")), Some("C001".to_string()));
        assert_eq!(clean_text(&text("   ")), None);
        assert_eq!(clean_text(&CellValue::Empty), None);
        assert_eq!(clean_text(&CellValue::Number(1001.0)), Some("1001".to_string()));
    }

    #[test]
    fn test_first_positive_fallback() {
        let empty = text("");
        let zero = CellValue::Number(0.0);
        let second = text("2,000");
        assert_eq!(first_positive(&[&empty, &second]), Some(2000.0));
        assert_eq!(first_positive(&[&zero, &second]), Some(2000.0));
        assert_eq!(first_positive(&[&empty, &zero]), None);
    }
}
