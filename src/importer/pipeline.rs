// ==========================================
// 代购业务数据迁移 - 迁移流程编排
// ==========================================
// 流程:
// 1. 初始化客户等级
// 2. 读取工作表（空运 / 海运 / 门店自提 / 收款台账）
// 3. 解析并创建客户
// 4. 分组创建订单与明细（建立关联索引）
// 5. 收款对账
// 6. 汇总
// 红线: 单次、线性、所有存储调用依次 await
// ==========================================

use crate::config::{MigrationSettings, SheetRole};
use crate::domain::{Customer, Payment, ShippingChannel, TierCode};
use crate::importer::context::RunContext;
use crate::importer::entity_resolver::{create_customers, CustomerRegistry};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::map_payment_row;
use crate::importer::order_grouper::{create_orders, OrderStageOutcome};
use crate::importer::payment_reconciler::reconcile_payments;
use crate::importer::sheet_reader::{read_detected, read_with_header, RawRecord};
use crate::importer::stage::{SkipReason, StageOutcome};
use crate::importer::tier_seeder::seed_tiers;
use crate::importer::workbook::WorkbookSource;
use crate::repository::{EntityKind, MigrationStore};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// 诊断日志中的 Item Code 样本数
const DIAGNOSTIC_SAMPLE_SIZE: usize = 5;
use tracing::{debug, info, instrument, warn};

// ==========================================
// RunSummary - 运行汇总
// ==========================================

/// 单类实体的计数
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityTally {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 运行结束后存储中的总数（读取失败时为空）
    pub stored: Option<i64>,
}

impl EntityTally {
    fn from_outcome<T>(outcome: &StageOutcome<T>) -> Self {
        Self {
            created: outcome.created.len(),
            skipped: outcome.skipped.len(),
            failed: outcome.failed.len(),
            stored: None,
        }
    }
}

impl fmt::Display for EntityTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "新建 {} / 跳过 {} / 失败 {}",
            self.created, self.skipped, self.failed
        )?;
        if let Some(stored) = self.stored {
            write!(f, " / 库内 {}", stored)?;
        }
        Ok(())
    }
}

/// 收款台账行的拒绝统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentRejections {
    pub no_item_code: usize,
    pub no_match: usize,
    pub no_amount: usize,
    pub already_imported: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub tiers: EntityTally,
    pub customers: EntityTally,
    pub orders: EntityTally,
    pub items: EntityTally,
    pub payments: EntityTally,
    pub rejections: PaymentRejections,
    /// 被判定为重复而撤回的 Item Code
    pub ambiguous_item_codes: Vec<String>,
    pub elapsed_ms: u128,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "迁移完成 ({}，耗时 {} ms)", self.run_date, self.elapsed_ms)?;
        writeln!(f, "  客户等级: {}", self.tiers)?;
        writeln!(f, "  客户:     {}", self.customers)?;
        writeln!(f, "  订单:     {}", self.orders)?;
        writeln!(f, "  订单明细: {}", self.items)?;
        writeln!(f, "  收款:     {}", self.payments)?;
        writeln!(
            f,
            "  收款跳过: 无 Item Code {} / 无匹配 {} / 无金额 {} / 已导入 {} / 错误 {}",
            self.rejections.no_item_code,
            self.rejections.no_match,
            self.rejections.no_amount,
            self.rejections.already_imported,
            self.rejections.errors
        )?;
        if !self.ambiguous_item_codes.is_empty() {
            writeln!(f, "  重复 Item Code: {}", self.ambiguous_item_codes.join(", "))?;
        }
        Ok(())
    }
}

// ==========================================
// RunReport - 各阶段完整结果 + 汇总
// ==========================================
#[derive(Debug)]
pub struct RunReport {
    pub tiers: StageOutcome<TierCode>,
    pub customers: StageOutcome<Customer>,
    pub orders: OrderStageOutcome,
    pub payments: StageOutcome<Payment>,
    pub summary: RunSummary,
}

// ==========================================
// MigrationPipeline
// ==========================================
pub struct MigrationPipeline<'a> {
    store: &'a dyn MigrationStore,
    settings: MigrationSettings,
}

impl<'a> MigrationPipeline<'a> {
    pub fn new(store: &'a dyn MigrationStore, settings: MigrationSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &MigrationSettings {
        &self.settings
    }

    /// 读取工作表，缺失时告警并返回空
    fn read_sheet(
        &self,
        workbook: &mut dyn WorkbookSource,
        role: SheetRole,
    ) -> ImportResult<Vec<RawRecord>> {
        let name = self.settings.sheets.get(role);

        let grid = match workbook.read_sheet(name)? {
            Some(grid) => grid,
            None => {
                warn!(sheet = name, "工作表不存在，按空表处理");
                return Ok(Vec::new());
            }
        };

        let records = match role {
            SheetRole::Payments => read_with_header(&grid),
            _ => read_detected(name, &grid),
        };
        info!(sheet = name, rows = records.len(), "工作表读取完成");
        if let Some(first) = records.first() {
            let mut columns: Vec<&str> = first.columns().collect();
            columns.sort_unstable();
            debug!(sheet = name, ?columns, "首行列名");
        }
        Ok(records)
    }

    /// 执行一次完整迁移
    ///
    /// # 参数
    /// - workbook: 源工作簿
    /// - run_date: 运行日期（订单号中的 YYMM）
    ///
    /// # 返回
    /// - Ok(RunReport): 各阶段结果（行级失败包含在其中）
    /// - Err: 工作表无法解析等致命错误
    #[instrument(skip(self, workbook), fields(policy = %self.settings.duplicate_item_code_policy))]
    pub async fn run(
        &self,
        workbook: &mut dyn WorkbookSource,
        run_date: NaiveDate,
    ) -> ImportResult<RunReport> {
        let start = Instant::now();
        let progress_every = self.settings.progress_every;
        let mut ctx = RunContext::new(run_date, self.settings.duplicate_item_code_policy);

        // === 步骤 1: 客户等级 ===
        let tiers = seed_tiers(self.store).await;

        // === 步骤 2: 读取工作表 ===
        debug!(sheets = ?workbook.sheet_names(), "工作簿包含的工作表");
        let air = self.read_sheet(workbook, SheetRole::Air)?;
        let sea = self.read_sheet(workbook, SheetRole::Sea)?;
        let pickup = self.read_sheet(workbook, SheetRole::Pickup)?;
        let ledger = self.read_sheet(workbook, SheetRole::Payments)?;

        // === 步骤 3: 客户 ===
        let registry = CustomerRegistry::from_records(air.iter().chain(&sea).chain(&pickup));
        info!(customers = registry.len(), "客户登记完成");
        let resolution = create_customers(self.store, &registry, progress_every).await;
        ctx.customer_ids = resolution.ids;

        // === 步骤 4: 订单与明细 ===
        let mut orders = OrderStageOutcome::default();
        for channel in ShippingChannel::ALL {
            let records = match channel {
                ShippingChannel::Air => &air,
                ShippingChannel::Sea => &sea,
                ShippingChannel::Pickup => &pickup,
            };
            let outcome = create_orders(self.store, channel, records, &mut ctx, progress_every).await;
            orders.merge(outcome);
        }
        info!(indexed = ctx.correlation.len(), "关联索引建立完成");
        debug!(
            samples = ?ctx.correlation.sample_codes(DIAGNOSTIC_SAMPLE_SIZE),
            "关联索引 Item Code 样本"
        );
        let ledger_samples: Vec<String> = ledger
            .iter()
            .filter_map(|record| map_payment_row(record).item_code)
            .take(DIAGNOSTIC_SAMPLE_SIZE)
            .collect();
        debug!(samples = ?ledger_samples, "收款台账 Item Code 样本");

        // === 步骤 5: 收款 ===
        let payments = reconcile_payments(self.store, &ledger, &ctx.correlation, progress_every).await;

        // === 步骤 6: 汇总 ===
        let mut summary = RunSummary {
            run_date,
            tiers: EntityTally::from_outcome(&tiers),
            customers: EntityTally::from_outcome(&resolution.outcome),
            orders: EntityTally::from_outcome(&orders.orders),
            items: EntityTally::from_outcome(&orders.items),
            payments: EntityTally::from_outcome(&payments),
            rejections: PaymentRejections {
                no_item_code: payments.skipped_count(SkipReason::NoItemCode),
                no_match: payments.skipped_count(SkipReason::NoMatch),
                no_amount: payments.skipped_count(SkipReason::NoAmount),
                already_imported: payments.skipped_count(SkipReason::AlreadyImported),
                errors: payments.failed.len(),
            },
            ambiguous_item_codes: ctx
                .correlation
                .ambiguous_codes()
                .into_iter()
                .map(str::to_string)
                .collect(),
            elapsed_ms: 0,
        };

        summary.tiers.stored = self.stored_count(EntityKind::Tier).await;
        summary.customers.stored = self.stored_count(EntityKind::Customer).await;
        summary.orders.stored = self.stored_count(EntityKind::Order).await;
        summary.items.stored = self.stored_count(EntityKind::OrderItem).await;
        summary.payments.stored = self.stored_count(EntityKind::Payment).await;
        summary.elapsed_ms = start.elapsed().as_millis();

        info!(
            customers = summary.customers.created,
            orders = summary.orders.created,
            items = summary.items.created,
            payments = summary.payments.created,
            elapsed_ms = summary.elapsed_ms,
            "迁移完成"
        );

        Ok(RunReport {
            tiers,
            customers: resolution.outcome,
            orders,
            payments,
            summary,
        })
    }

    async fn stored_count(&self, kind: EntityKind) -> Option<i64> {
        match self.store.count(kind).await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(entity = %kind, error = %e, "统计存储总数失败");
                None
            }
        }
    }
}
