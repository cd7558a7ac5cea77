// ==========================================
// 代购业务数据迁移 - 收款对账
// ==========================================
// 台账行 → 经 Item Code 关联到订单明细 → 收款记录
// 判定顺序: 无 Item Code → 无匹配 → 无金额，每行最多一个跳过原因
// ==========================================

use crate::domain::{
    InstallmentKind, NewPayment, Payment, DEFAULT_PAYMENT_METHOD, PAYMENT_STATUS_VERIFIED,
};
use crate::importer::correlation::CorrelationIndex;
use crate::importer::field_mapper::{map_payment_row, PaymentRow};
use crate::importer::sheet_reader::RawRecord;
use crate::importer::stage::{SkipReason, StageOutcome};
use crate::repository::MigrationStore;
use tracing::{debug, error, info};

/// 台账行 → 待创建收款
///
/// # 返回
/// - Ok(NewPayment): 可创建
/// - Err(SkipReason): 第一个不满足的条件
pub fn plan_payment(row: &PaymentRow, index: &CorrelationIndex) -> Result<NewPayment, SkipReason> {
    let item_code = row.item_code.as_deref().ok_or(SkipReason::NoItemCode)?;
    let order_item_id = index.get(item_code).ok_or(SkipReason::NoMatch)?;
    let amount = row.amount.ok_or(SkipReason::NoAmount)?;

    let kind = InstallmentKind::classify(row.payment_type.as_deref());

    Ok(NewPayment {
        order_item_id: order_item_id.to_string(),
        installment_number: kind.number(),
        installment_name: kind.display_name().to_string(),
        amount,
        slip_amount: amount,
        status: PAYMENT_STATUS_VERIFIED.to_string(),
        payment_method: row
            .payment_method
            .clone()
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
        paid_at: row.paid_at,
        notes: row.notes.clone(),
        verified_by: row.verified_by.clone(),
    })
}

/// 对账并创建收款记录
pub async fn reconcile_payments(
    store: &dyn MigrationStore,
    records: &[RawRecord],
    index: &CorrelationIndex,
    progress_every: usize,
) -> StageOutcome<Payment> {
    let mut outcome = StageOutcome::new();

    info!(rows = records.len(), indexed = index.len(), "开始收款对账");

    for record in records {
        let subject = format!("payments#{}", record.row_number);
        let row = map_payment_row(record);

        let new_payment = match plan_payment(&row, index) {
            Ok(p) => p,
            Err(reason) => {
                debug!(row = record.row_number, reason = %reason, "收款行跳过");
                outcome.push_skipped(subject, reason);
                continue;
            }
        };

        match store.create_payment(&new_payment).await {
            Ok(payment) => {
                outcome.push_created(payment);
                let created = outcome.created.len();
                if progress_every > 0 && created % progress_every == 0 {
                    info!(created, "收款创建进度");
                }
            }
            Err(e) if e.is_duplicate() => {
                outcome.push_skipped(subject, SkipReason::AlreadyImported);
            }
            Err(e) => {
                error!(row = record.row_number, error = %e, "收款创建失败");
                outcome.push_failed(subject, e, record.to_json());
            }
        }
    }

    info!(
        created = outcome.created.len(),
        no_item_code = outcome.skipped_count(SkipReason::NoItemCode),
        no_match = outcome.skipped_count(SkipReason::NoMatch),
        no_amount = outcome.skipped_count(SkipReason::NoAmount),
        errors = outcome.failed.len(),
        "收款对账完成"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::correlation::DuplicateItemCodePolicy;

    fn payment_row(item_code: Option<&str>, amount: Option<f64>, payment_type: Option<&str>) -> PaymentRow {
        PaymentRow {
            item_code: item_code.map(str::to_string),
            amount,
            payment_type: payment_type.map(str::to_string),
            payment_method: None,
            paid_at: None,
            notes: None,
            verified_by: Some("admin01".to_string()),
        }
    }

    fn index_with(code: &str, item_id: &str) -> CorrelationIndex {
        let mut index = CorrelationIndex::new(DuplicateItemCodePolicy::Reject);
        index.insert(code, item_id);
        index
    }

    #[test]
    fn test_reason_order() {
        let index = index_with("IC-1", "item-1");

        // 无 Item Code 优先于无金额
        assert_eq!(
            plan_payment(&payment_row(None, None, None), &index),
            Err(SkipReason::NoItemCode)
        );
        // 无匹配优先于无金额
        assert_eq!(
            plan_payment(&payment_row(Some("IC-X"), None, None), &index),
            Err(SkipReason::NoMatch)
        );
        assert_eq!(
            plan_payment(&payment_row(Some("IC-1"), None, None), &index),
            Err(SkipReason::NoAmount)
        );
    }

    #[test]
    fn test_deposit_payment() {
        let index = index_with("IC-1", "item-1");
        let payment = plan_payment(&payment_row(Some("IC-1"), Some(500.0), Some("มัดจำ")), &index).unwrap();

        assert_eq!(payment.order_item_id, "item-1");
        assert_eq!(payment.installment_number, 1);
        assert_eq!(payment.installment_name, "มัดจำ");
        assert_eq!(payment.amount, 500.0);
        assert_eq!(payment.slip_amount, 500.0);
        assert_eq!(payment.status, PAYMENT_STATUS_VERIFIED);
        assert_eq!(payment.payment_method, DEFAULT_PAYMENT_METHOD);
        assert_eq!(payment.verified_by.as_deref(), Some("admin01"));
    }

    #[test]
    fn test_shipping_installment() {
        let index = index_with("IC-1", "item-1");
        let payment =
            plan_payment(&payment_row(Some("IC-1"), Some(80.0), Some("รวมค่าส่ง")), &index).unwrap();
        assert_eq!(payment.installment_number, 2);
        assert_eq!(payment.installment_name, "รวมค่าส่ง");
    }

    #[test]
    fn test_ambiguous_code_is_no_match() {
        let mut index = index_with("IC-1", "item-1");
        index.insert("IC-1", "item-2");

        assert_eq!(
            plan_payment(&payment_row(Some("IC-1"), Some(100.0), None), &index),
            Err(SkipReason::NoMatch)
        );
    }
}
