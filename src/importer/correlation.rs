// ==========================================
// 代购业务数据迁移 - Item Code 关联索引
// ==========================================
// Item Code → 订单明细身份
// 订单阶段写入，收款阶段只读
// ==========================================

use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

// ==========================================
// DuplicateItemCodePolicy - 重复 Item Code 策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateItemCodePolicy {
    /// 重复的 Item Code 从索引撤回，相关收款计为 NoMatch
    #[default]
    Reject,
    /// 后创建的明细覆盖先前的映射
    LastWins,
}

impl DuplicateItemCodePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateItemCodePolicy::Reject => "reject",
            DuplicateItemCodePolicy::LastWins => "last_wins",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(DuplicateItemCodePolicy::Reject),
            "last_wins" | "last-wins" => Some(DuplicateItemCodePolicy::LastWins),
            _ => None,
        }
    }
}

impl fmt::Display for DuplicateItemCodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// CorrelationIndex
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CorrelationIndex {
    policy: DuplicateItemCodePolicy,
    entries: HashMap<String, String>,
    ambiguous: HashSet<String>,
}

impl CorrelationIndex {
    pub fn new(policy: DuplicateItemCodePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            ambiguous: HashSet::new(),
        }
    }

    pub fn policy(&self) -> DuplicateItemCodePolicy {
        self.policy
    }

    /// 登记已创建明细的 Item Code
    ///
    /// # 返回
    /// - true: 该 Item Code 当前指向 item_id
    /// - false: 被策略拒绝（Item Code 已判定为歧义）
    pub fn insert(&mut self, item_code: &str, item_id: &str) -> bool {
        match self.policy {
            DuplicateItemCodePolicy::LastWins => {
                if let Some(previous) = self.entries.insert(item_code.to_string(), item_id.to_string()) {
                    warn!(item_code, previous = %previous, current = item_id, "Item Code 重复，使用后者");
                }
                true
            }
            DuplicateItemCodePolicy::Reject => {
                if self.ambiguous.contains(item_code) {
                    return false;
                }
                if self.entries.remove(item_code).is_some() {
                    warn!(item_code, "Item Code 重复，已从关联索引撤回");
                    self.ambiguous.insert(item_code.to_string());
                    return false;
                }
                self.entries.insert(item_code.to_string(), item_id.to_string());
                true
            }
        }
    }

    pub fn get(&self, item_code: &str) -> Option<&str> {
        self.entries.get(item_code).map(String::as_str)
    }

    pub fn is_ambiguous(&self, item_code: &str) -> bool {
        self.ambiguous.contains(item_code)
    }

    /// 被撤回的 Item Code（排序后）
    pub fn ambiguous_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.ambiguous.iter().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// 索引中的 Item Code 样本（排序后取前 limit 个）
    pub fn sample_codes(&self, limit: usize) -> Vec<&str> {
        let mut codes: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes.truncate(limit);
        codes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_withdraws_duplicate_code() {
        let mut index = CorrelationIndex::new(DuplicateItemCodePolicy::Reject);
        assert!(index.insert("IC-1", "item-a"));
        assert!(index.insert("IC-2", "item-b"));
        assert!(!index.insert("IC-1", "item-c"));
        // 第三次出现仍保持撤回
        assert!(!index.insert("IC-1", "item-d"));

        assert_eq!(index.get("IC-1"), None);
        assert!(index.is_ambiguous("IC-1"));
        assert_eq!(index.get("IC-2"), Some("item-b"));
        assert_eq!(index.ambiguous_codes(), vec!["IC-1"]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_last_wins_overwrites() {
        let mut index = CorrelationIndex::new(DuplicateItemCodePolicy::LastWins);
        assert!(index.insert("IC-1", "item-a"));
        assert!(index.insert("IC-1", "item-b"));
        assert_eq!(index.get("IC-1"), Some("item-b"));
        assert!(!index.is_ambiguous("IC-1"));
    }

    #[test]
    fn test_sample_codes_sorted_and_limited() {
        let mut index = CorrelationIndex::new(DuplicateItemCodePolicy::Reject);
        for (code, id) in [("IC-3", "c"), ("IC-1", "a"), ("IC-2", "b"), ("IC-1", "d")] {
            index.insert(code, id);
        }

        // IC-1 已撤回，不出现在样本中
        assert_eq!(index.sample_codes(5), vec!["IC-2", "IC-3"]);
        assert_eq!(index.sample_codes(1), vec!["IC-2"]);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            DuplicateItemCodePolicy::parse(" Last_Wins "),
            Some(DuplicateItemCodePolicy::LastWins)
        );
        assert_eq!(
            DuplicateItemCodePolicy::parse("reject"),
            Some(DuplicateItemCodePolicy::Reject)
        );
        assert_eq!(DuplicateItemCodePolicy::parse("first"), None);
        assert_eq!(DuplicateItemCodePolicy::default(), DuplicateItemCodePolicy::Reject);
    }
}
