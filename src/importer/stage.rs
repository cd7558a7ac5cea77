// ==========================================
// 代购业务数据迁移 - 阶段结果
// ==========================================
// 每个阶段返回 {created, skipped, failed}，
// 保留“单行失败不终止运行”的语义，同时让结果可断言
// ==========================================

use serde::Serialize;
use std::fmt;

// ==========================================
// SkipReason - 跳过原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 违反唯一约束（视为已导入）
    AlreadyImported,
    /// 客户已存在，复用已有身份
    ExistingCustomer,
    /// 所属订单未能创建
    OrderNotCreated,
    /// 收款行无 Item Code
    NoItemCode,
    /// Item Code 不在关联索引中
    NoMatch,
    /// 两个金额字段都不是正数
    NoAmount,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::AlreadyImported => "already imported",
            SkipReason::ExistingCustomer => "existing customer",
            SkipReason::OrderNotCreated => "order not created",
            SkipReason::NoItemCode => "no item code",
            SkipReason::NoMatch => "no match",
            SkipReason::NoAmount => "no amount",
        };
        write!(f, "{}", text)
    }
}

/// 被跳过的行/实体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    /// 定位信息（工作表行号、客户代码、订单号等）
    pub subject: String,
    pub reason: SkipReason,
}

/// 创建失败的行/实体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFailure {
    pub subject: String,
    pub cause: String,
    /// 原始行数据（JSON），无对应行时为 Null
    pub raw_data: serde_json::Value,
}

// ==========================================
// StageOutcome - 阶段结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutcome<T> {
    pub created: Vec<T>,
    pub skipped: Vec<Skipped>,
    pub failed: Vec<StageFailure>,
}

impl<T> Default for StageOutcome<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> StageOutcome<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_created(&mut self, value: T) {
        self.created.push(value);
    }

    pub fn push_skipped(&mut self, subject: impl Into<String>, reason: SkipReason) {
        self.skipped.push(Skipped {
            subject: subject.into(),
            reason,
        });
    }

    pub fn push_failed(
        &mut self,
        subject: impl Into<String>,
        cause: impl fmt::Display,
        raw_data: serde_json::Value,
    ) {
        self.failed.push(StageFailure {
            subject: subject.into(),
            cause: cause.to_string(),
            raw_data,
        });
    }

    /// 指定原因的跳过数
    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    /// 处理的总条数
    pub fn total(&self) -> usize {
        self.created.len() + self.skipped.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_counts_by_reason() {
        let mut outcome: StageOutcome<u32> = StageOutcome::new();
        outcome.push_created(1);
        outcome.push_skipped("row 3", SkipReason::NoMatch);
        outcome.push_skipped("row 4", SkipReason::NoMatch);
        outcome.push_skipped("row 5", SkipReason::NoAmount);
        outcome.push_failed("row 6", "disk full", Value::Null);

        assert_eq!(outcome.skipped_count(SkipReason::NoMatch), 2);
        assert_eq!(outcome.skipped_count(SkipReason::NoItemCode), 0);
        assert_eq!(outcome.failed[0].cause, "disk full");
        assert_eq!(outcome.total(), 5);
    }
}
