// ==========================================
// 代购业务数据迁移 - 迁移存储 Repository Trait
// ==========================================
// 职责: 定义迁移流程所需的持久化接口（不包含业务逻辑）
// 操作: upsert（按自然键，仅等级）/ create / list / count
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewPayment, Order, OrderItem, Payment, Tier,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::fmt;

/// 可计数的实体类型（用于运行汇总）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tier,
    Customer,
    Order,
    OrderItem,
    Payment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Tier => "tier",
            EntityKind::Customer => "customer",
            EntityKind::Order => "order",
            EntityKind::OrderItem => "order_item",
            EntityKind::Payment => "payment",
        };
        write!(f, "{}", name)
    }
}

// ==========================================
// MigrationStore Trait
// ==========================================
// 用途: 迁移流程的唯一持久化出口
// 实现者: SqliteMigrationStore（使用 rusqlite）
//
// create_* 在违反唯一约束时必须返回
// RepositoryError::UniqueConstraintViolation，以便调用方区分“已导入”
#[async_trait]
pub trait MigrationStore: Send + Sync {
    // ===== 等级（幂等）=====

    /// 按 tier_code upsert 等级
    async fn upsert_tier(&self, tier: &Tier) -> RepositoryResult<()>;

    /// 列出全部等级（按 sort_order）
    async fn list_tiers(&self) -> RepositoryResult<Vec<Tier>>;

    // ===== 创建 =====

    async fn create_customer(&self, customer: &NewCustomer) -> RepositoryResult<Customer>;

    async fn create_order(&self, order: &NewOrder) -> RepositoryResult<Order>;

    async fn create_order_item(&self, item: &NewOrderItem) -> RepositoryResult<OrderItem>;

    async fn create_payment(&self, payment: &NewPayment) -> RepositoryResult<Payment>;

    // ===== 查询 =====

    /// 列出全部客户（按创建顺序）
    async fn list_customers(&self) -> RepositoryResult<Vec<Customer>>;

    /// 列出指定订单的明细（按 sequence_number）
    async fn list_order_items(&self, order_id: &str) -> RepositoryResult<Vec<OrderItem>>;

    /// 统计实体数量
    async fn count(&self, kind: EntityKind) -> RepositoryResult<i64>;
}
