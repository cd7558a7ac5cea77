// ==========================================
// 代购业务数据迁移 - 订单分组与创建
// ==========================================
// 每个渠道工作表: 按客户分组 → 每组一个订单 → 组内行依次成为明细
// 创建成功且带 Item Code 的明细登记到关联索引
// 单行/单组失败只记录，不终止
// ==========================================

use crate::domain::{NewOrder, NewOrderItem, Order, OrderItem, ShippingChannel};
use crate::importer::context::RunContext;
use crate::importer::field_mapper::{group_key, map_item_draft, ItemDraft};
use crate::importer::sheet_reader::RawRecord;
use crate::importer::stage::{SkipReason, StageOutcome};
use crate::repository::MigrationStore;
use std::collections::HashMap;
use tracing::{error, info, warn};

// ==========================================
// OrderProfile - 渠道订单默认值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderProfile {
    pub status: &'static str,
    pub status_step: i32,
    pub origin: &'static str,
    pub destination: &'static str,
}

impl OrderProfile {
    pub fn for_channel(channel: ShippingChannel) -> Self {
        if channel.is_cross_border() {
            OrderProfile {
                status: "processing",
                status_step: 3,
                origin: "Japan",
                destination: "Thailand",
            }
        } else {
            OrderProfile {
                status: "completed",
                status_step: 9,
                origin: "Store",
                destination: "Store Pickup",
            }
        }
    }
}

// ==========================================
// OrderGroup - 订单分组
// ==========================================
#[derive(Debug, Clone)]
pub struct OrderGroup<'a> {
    pub key: String,
    pub rows: Vec<&'a RawRecord>,
}

/// 按分组键归并，组按首次出现排序，组内保持源顺序
pub fn group_records(channel: ShippingChannel, records: &[RawRecord]) -> Vec<OrderGroup<'_>> {
    let mut groups: Vec<OrderGroup<'_>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = group_key(channel, record);
        match positions.get(&key) {
            Some(&idx) => groups[idx].rows.push(record),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(OrderGroup {
                    key,
                    rows: vec![record],
                });
            }
        }
    }

    groups
}

/// 订单与明细两级结果
#[derive(Debug, Default)]
pub struct OrderStageOutcome {
    pub orders: StageOutcome<Order>,
    pub items: StageOutcome<OrderItem>,
}

impl OrderStageOutcome {
    pub fn merge(&mut self, other: OrderStageOutcome) {
        self.orders.created.extend(other.orders.created);
        self.orders.skipped.extend(other.orders.skipped);
        self.orders.failed.extend(other.orders.failed);
        self.items.created.extend(other.items.created);
        self.items.skipped.extend(other.items.skipped);
        self.items.failed.extend(other.items.failed);
    }
}

fn row_subject(channel: ShippingChannel, record: &RawRecord) -> String {
    format!("{}#{}", channel, record.row_number)
}

fn build_item(order_id: &str, sequence_number: i32, customer_name: &str, draft: ItemDraft) -> NewOrderItem {
    NewOrderItem {
        order_id: order_id.to_string(),
        sequence_number,
        customer_name: customer_name.to_string(),
        item_code: draft.item_code,
        product_code: draft.product_code,
        product_name: draft.product_name,
        product_url: draft.product_url,
        price_yen: draft.price_yen,
        price_baht: draft.price_baht,
        item_status: draft.item_status,
        payment_status: draft.payment_status,
        status_step: draft.status_step,
        shipping_round: draft.shipping_round,
        remarks: draft.remarks,
        click_date: draft.click_date,
    }
}

/// 为一个渠道工作表创建订单与明细
///
/// # 参数
/// - channel: 运输渠道
/// - records: 该渠道工作表的行记录
/// - ctx: 运行上下文（订单计数 / 客户映射 / 关联索引）
/// - progress_every: 每创建多少个订单输出一次进度
pub async fn create_orders(
    store: &dyn MigrationStore,
    channel: ShippingChannel,
    records: &[RawRecord],
    ctx: &mut RunContext,
    progress_every: usize,
) -> OrderStageOutcome {
    let profile = OrderProfile::for_channel(channel);
    let groups = group_records(channel, records);
    let mut outcome = OrderStageOutcome::default();

    info!(channel = %channel, groups = groups.len(), rows = records.len(), "开始创建订单");

    for group in groups {
        let drafts: Vec<ItemDraft> = group
            .rows
            .iter()
            .map(|record| map_item_draft(channel, record, profile.status_step))
            .collect();
        let prices: Vec<f64> = drafts.iter().filter_map(|d| d.price_baht).collect();
        let estimated_cost = (!prices.is_empty()).then(|| prices.iter().sum::<f64>());

        let new_order = NewOrder {
            order_number: ctx.next_order_number(channel),
            customer_id: ctx.customer_id(&group.key),
            shipping_channel: channel,
            status: profile.status.to_string(),
            status_step: profile.status_step,
            origin: profile.origin.to_string(),
            destination: profile.destination.to_string(),
            estimated_cost,
        };

        let order = match store.create_order(&new_order).await {
            Ok(order) => order,
            Err(e) => {
                if e.is_duplicate() {
                    outcome
                        .orders
                        .push_skipped(new_order.order_number.clone(), SkipReason::AlreadyImported);
                } else {
                    error!(order_number = %new_order.order_number, error = %e, "订单创建失败");
                    outcome.orders.push_failed(
                        new_order.order_number.clone(),
                        e,
                        serde_json::json!({ "customer": group.key, "rows": group.rows.len() }),
                    );
                }
                for record in &group.rows {
                    outcome
                        .items
                        .push_skipped(row_subject(channel, record), SkipReason::OrderNotCreated);
                }
                continue;
            }
        };

        for (idx, (record, draft)) in group.rows.iter().zip(drafts).enumerate() {
            let new_item = build_item(&order.id, idx as i32 + 1, &group.key, draft);

            match store.create_order_item(&new_item).await {
                Ok(item) => {
                    if let Some(code) = item.fields.item_code.as_deref() {
                        ctx.correlation.insert(code, &item.id);
                    }
                    outcome.items.push_created(item);
                }
                Err(e) if e.is_duplicate() => {
                    outcome
                        .items
                        .push_skipped(row_subject(channel, record), SkipReason::AlreadyImported);
                }
                Err(e) => {
                    error!(
                        order_number = %order.fields.order_number,
                        row = record.row_number,
                        error = %e,
                        "订单明细创建失败"
                    );
                    outcome
                        .items
                        .push_failed(row_subject(channel, record), e, record.to_json());
                }
            }
        }

        outcome.orders.push_created(order);
        let created = outcome.orders.created.len();
        if progress_every > 0 && created % progress_every == 0 {
            info!(channel = %channel, created, "订单创建进度");
        }
    }

    if !outcome.orders.failed.is_empty() || !outcome.items.failed.is_empty() {
        warn!(
            channel = %channel,
            failed_orders = outcome.orders.failed.len(),
            failed_items = outcome.items.failed.len(),
            "部分订单/明细创建失败"
        );
    }
    info!(
        channel = %channel,
        orders = outcome.orders.created.len(),
        items = outcome.items.created.len(),
        "订单创建完成"
    );
    outcome
}
