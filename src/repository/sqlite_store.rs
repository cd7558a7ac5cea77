// ==========================================
// 代购业务数据迁移 - 迁移存储 Repository 实现
// ==========================================
// 职责: 实现 MigrationStore（使用 rusqlite）
// 说明: 每次 create 独立提交，迁移流程不做多行事务
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewPayment, Order, OrderItem, Payment,
    ShippingChannel, Tier, TierCode,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::migration_store::{EntityKind, MigrationStore};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

fn parse_tier_code(raw: &str) -> RepositoryResult<TierCode> {
    TierCode::parse(raw).ok_or_else(|| RepositoryError::FieldValueError {
        field: "tier_code".to_string(),
        message: format!("未知等级代码: {}", raw),
    })
}

fn parse_channel(raw: &str) -> RepositoryResult<ShippingChannel> {
    ShippingChannel::parse(raw).ok_or_else(|| RepositoryError::FieldValueError {
        field: "shipping_method".to_string(),
        message: format!("未知运输渠道: {}", raw),
    })
}

// ==========================================
// SqliteMigrationStore
// ==========================================
pub struct SqliteMigrationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMigrationStore {
    /// 打开数据库并确保 schema 存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责 PRAGMA 与 schema）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 共享底层连接（供 ConfigManager 复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[async_trait]
impl MigrationStore for SqliteMigrationStore {
    async fn upsert_tier(&self, tier: &Tier) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO customer_tier (
                tier_code, tier_name, tier_name_th, exchange_rate, min_spent,
                max_spent, color, icon, sort_order, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(tier_code) DO UPDATE SET
                tier_name = excluded.tier_name,
                tier_name_th = excluded.tier_name_th,
                exchange_rate = excluded.exchange_rate,
                min_spent = excluded.min_spent,
                max_spent = excluded.max_spent,
                color = excluded.color,
                icon = excluded.icon,
                sort_order = excluded.sort_order,
                is_active = excluded.is_active
            "#,
            params![
                tier.code.as_str(),
                tier.display_name,
                tier.localized_name,
                tier.exchange_rate,
                tier.min_spend,
                tier.max_spend,
                tier.display_color,
                tier.icon,
                tier.sort_order,
                tier.active as i32,
            ],
        )?;
        Ok(())
    }

    async fn list_tiers(&self) -> RepositoryResult<Vec<Tier>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT tier_code, tier_name, tier_name_th, exchange_rate, min_spent,
                   max_spent, color, icon, sort_order, is_active
            FROM customer_tier
            ORDER BY sort_order
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                Tier {
                    code: TierCode::Regular,
                    display_name: row.get(1)?,
                    localized_name: row.get(2)?,
                    exchange_rate: row.get(3)?,
                    min_spend: row.get(4)?,
                    max_spend: row.get(5)?,
                    display_color: row.get(6)?,
                    icon: row.get(7)?,
                    sort_order: row.get(8)?,
                    active: row.get::<_, i32>(9)? != 0,
                },
            ))
        })?;

        let mut tiers = Vec::new();
        for row in rows {
            let (code, mut tier) = row?;
            tier.code = parse_tier_code(&code)?;
            tiers.push(tier);
        }
        Ok(tiers)
    }

    async fn create_customer(&self, customer: &NewCustomer) -> RepositoryResult<Customer> {
        let conn = self.get_conn()?;
        let id = Self::new_id();
        conn.execute(
            r#"
            INSERT INTO customer (id, company_name, contact_person, tier, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                id,
                customer.display_name,
                customer.display_name,
                customer.tier_code.as_str(),
                customer.active as i32,
            ],
        )?;

        Ok(Customer {
            id,
            display_name: customer.display_name.clone(),
            tier_code: customer.tier_code,
            active: customer.active,
        })
    }

    async fn create_order(&self, order: &NewOrder) -> RepositoryResult<Order> {
        let conn = self.get_conn()?;
        let id = Self::new_id();
        conn.execute(
            r#"
            INSERT INTO orders (
                id, order_number, customer_id, shipping_method, status,
                status_step, origin, destination, estimated_cost
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id,
                order.order_number,
                order.customer_id,
                order.shipping_channel.as_str(),
                order.status,
                order.status_step,
                order.origin,
                order.destination,
                order.estimated_cost,
            ],
        )?;

        Ok(Order {
            id,
            fields: order.clone(),
        })
    }

    async fn create_order_item(&self, item: &NewOrderItem) -> RepositoryResult<OrderItem> {
        let conn = self.get_conn()?;
        let id = Self::new_id();
        conn.execute(
            r#"
            INSERT INTO order_item (
                id, order_id, sequence_number, customer_name, item_code,
                product_code, product_name, product_url, price_yen, price_baht,
                item_status, payment_status, status_step, shipping_round,
                remarks, click_date
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16
            )
            "#,
            params![
                id,
                item.order_id,
                item.sequence_number,
                item.customer_name,
                item.item_code,
                item.product_code,
                item.product_name,
                item.product_url,
                item.price_yen,
                item.price_baht,
                item.item_status,
                item.payment_status,
                item.status_step,
                item.shipping_round,
                item.remarks,
                item.click_date,
            ],
        )?;

        Ok(OrderItem {
            id,
            fields: item.clone(),
        })
    }

    async fn create_payment(&self, payment: &NewPayment) -> RepositoryResult<Payment> {
        let conn = self.get_conn()?;
        let id = Self::new_id();
        conn.execute(
            r#"
            INSERT INTO payment (
                id, order_item_id, installment_number, installment_name,
                amount_baht, slip_amount, status, payment_method, paid_at,
                notes, verified_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                id,
                payment.order_item_id,
                payment.installment_number,
                payment.installment_name,
                payment.amount,
                payment.slip_amount,
                payment.status,
                payment.payment_method,
                payment.paid_at,
                payment.notes,
                payment.verified_by,
            ],
        )?;

        Ok(Payment {
            id,
            fields: payment.clone(),
        })
    }

    async fn list_customers(&self) -> RepositoryResult<Vec<Customer>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, company_name, tier, is_active FROM customer ORDER BY created_at, rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i32>(3)?,
            ))
        })?;

        let mut customers = Vec::new();
        for row in rows {
            let (id, display_name, tier, active) = row?;
            customers.push(Customer {
                id,
                display_name,
                tier_code: parse_tier_code(&tier)?,
                active: active != 0,
            });
        }
        Ok(customers)
    }

    async fn list_order_items(&self, order_id: &str) -> RepositoryResult<Vec<OrderItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, order_id, sequence_number, customer_name, item_code,
                   product_code, product_name, product_url, price_yen, price_baht,
                   item_status, payment_status, status_step, shipping_round,
                   remarks, click_date
            FROM order_item
            WHERE order_id = ?1
            ORDER BY sequence_number
            "#,
        )?;

        let items = stmt
            .query_map(params![order_id], |row| {
                Ok(OrderItem {
                    id: row.get(0)?,
                    fields: NewOrderItem {
                        order_id: row.get(1)?,
                        sequence_number: row.get(2)?,
                        customer_name: row.get(3)?,
                        item_code: row.get(4)?,
                        product_code: row.get(5)?,
                        product_name: row.get(6)?,
                        product_url: row.get(7)?,
                        price_yen: row.get(8)?,
                        price_baht: row.get(9)?,
                        item_status: row.get(10)?,
                        payment_status: row.get(11)?,
                        status_step: row.get(12)?,
                        shipping_round: row.get(13)?,
                        remarks: row.get(14)?,
                        click_date: row.get(15)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    async fn count(&self, kind: EntityKind) -> RepositoryResult<i64> {
        let table = match kind {
            EntityKind::Tier => "customer_tier",
            EntityKind::Customer => "customer",
            EntityKind::Order => "orders",
            EntityKind::OrderItem => "order_item",
            EntityKind::Payment => "payment",
        };

        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count)
    }
}

impl SqliteMigrationStore {
    /// 按订单号查询订单（测试与排查用）
    pub fn find_order_by_number(&self, order_number: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            r#"
            SELECT id, order_number, customer_id, shipping_method, status,
                   status_step, origin, destination, estimated_cost
            FROM orders
            WHERE order_number = ?1
            "#,
            params![order_number],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i32>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, Option<f64>>(8)?,
                ))
            },
        );

        match result {
            Ok((id, number, customer_id, channel, status, step, origin, destination, cost)) => {
                Ok(Some(Order {
                    id,
                    fields: NewOrder {
                        order_number: number,
                        customer_id,
                        shipping_channel: parse_channel(&channel)?,
                        status,
                        status_step: step,
                        origin,
                        destination,
                        estimated_cost: cost,
                    },
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::tier_seeder::tier_catalogue;

    fn memory_store() -> SqliteMigrationStore {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        SqliteMigrationStore::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn sample_order(number: &str) -> NewOrder {
        NewOrder {
            order_number: number.to_string(),
            customer_id: None,
            shipping_channel: ShippingChannel::Air,
            status: "processing".to_string(),
            status_step: 3,
            origin: "Japan".to_string(),
            destination: "Thailand".to_string(),
            estimated_cost: Some(1200.0),
        }
    }

    #[tokio::test]
    async fn test_upsert_tier_is_idempotent() {
        let store = memory_store();
        for _ in 0..3 {
            for tier in tier_catalogue() {
                store.upsert_tier(&tier).await.unwrap();
            }
        }

        assert_eq!(store.count(EntityKind::Tier).await.unwrap(), 4);
        let tiers = store.list_tiers().await.unwrap();
        assert_eq!(tiers[0].code, TierCode::Regular);
        assert_eq!(tiers[3].max_spend, None);
    }

    #[tokio::test]
    async fn test_duplicate_order_number_is_distinguishable() {
        let store = memory_store();
        store.create_order(&sample_order("AIR2501-00001")).await.unwrap();

        let err = store
            .create_order(&sample_order("AIR2501-00001"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_order_item_requires_existing_order() {
        let store = memory_store();
        let item = NewOrderItem {
            order_id: "missing".to_string(),
            sequence_number: 1,
            customer_name: "C001".to_string(),
            item_status: "pending".to_string(),
            status_step: 3,
            ..Default::default()
        };

        let err = store.create_order_item(&item).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_find_order_by_number_round_trip() {
        let store = memory_store();
        let created = store.create_order(&sample_order("SEA2501-00002")).await.unwrap();

        let found = store.find_order_by_number("SEA2501-00002").unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find_order_by_number("SEA2501-99999").unwrap().is_none());
    }
}
