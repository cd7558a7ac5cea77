// ==========================================
// 代购业务数据迁移 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod customer;
pub mod order;
pub mod payment;
pub mod tier;
pub mod types;

// 重导出核心类型
pub use customer::{Customer, NewCustomer};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use payment::{NewPayment, Payment, DEFAULT_PAYMENT_METHOD, PAYMENT_STATUS_VERIFIED};
pub use tier::Tier;
pub use types::{InstallmentKind, ShippingChannel, TierCode};
