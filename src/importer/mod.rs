// ==========================================
// 代购业务数据迁移 - 导入层
// ==========================================
// 职责: 工作簿 → 等级 / 客户 / 订单 / 明细 / 收款
// 来源: xlsx（calamine），测试使用内存工作簿
// ==========================================

// 模块声明
pub mod context;
pub mod correlation;
pub mod entity_resolver;
pub mod error;
pub mod field_mapper;
pub mod order_grouper;
pub mod payment_reconciler;
pub mod pipeline;
pub mod sheet_reader;
pub mod stage;
pub mod tier_seeder;
pub mod value_normalizer;
pub mod workbook;

// 重导出核心类型
pub use context::{format_order_number, RunContext};
pub use correlation::{CorrelationIndex, DuplicateItemCodePolicy};
pub use entity_resolver::{create_customers, CustomerRegistry, CustomerResolution};
pub use error::{ImportError, ImportResult};
pub use order_grouper::{create_orders, group_records, OrderProfile, OrderStageOutcome};
pub use payment_reconciler::{plan_payment, reconcile_payments};
pub use pipeline::{EntityTally, MigrationPipeline, PaymentRejections, RunReport, RunSummary};
pub use sheet_reader::{read_detected, read_with_header, RawRecord};
pub use stage::{SkipReason, Skipped, StageFailure, StageOutcome};
pub use tier_seeder::{seed_tiers, tier_catalogue};
pub use workbook::{CellValue, MemoryWorkbook, SheetGrid, WorkbookSource, XlsxWorkbook};
