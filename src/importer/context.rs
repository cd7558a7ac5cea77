// ==========================================
// 代购业务数据迁移 - 运行上下文
// ==========================================
// 单次运行内各阶段共享的状态，运行结束即丢弃
// ==========================================

use crate::domain::ShippingChannel;
use crate::importer::correlation::{CorrelationIndex, DuplicateItemCodePolicy};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RunContext {
    /// 运行日期（决定订单号中的 YYMM）
    pub run_date: NaiveDate,
    /// 客户代码 → 客户身份
    pub customer_ids: HashMap<String, String>,
    pub correlation: CorrelationIndex,
    /// 全局订单计数（跨渠道，每次创建尝试 +1）
    pub order_seq: u32,
}

impl RunContext {
    pub fn new(run_date: NaiveDate, policy: DuplicateItemCodePolicy) -> Self {
        Self {
            run_date,
            customer_ids: HashMap::new(),
            correlation: CorrelationIndex::new(policy),
            order_seq: 0,
        }
    }

    /// 推进计数并生成下一个订单号
    pub fn next_order_number(&mut self, channel: ShippingChannel) -> String {
        self.order_seq += 1;
        format_order_number(channel, self.run_date, self.order_seq)
    }

    pub fn customer_id(&self, key: &str) -> Option<String> {
        self.customer_ids.get(key).cloned()
    }
}

/// 订单号: <前缀><YY><MM>-<5 位序号>
pub fn format_order_number(channel: ShippingChannel, run_date: NaiveDate, seq: u32) -> String {
    format!(
        "{}{}-{:05}",
        channel.order_prefix(),
        run_date.format("%y%m"),
        seq
    )
}
