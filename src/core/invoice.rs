//! Invoice business logic - Handles the client-facing bill for a party.
//!
//! The invoice total is never stored independently of its inputs: every
//! create or edit recomputes it from the line items minus discount plus
//! surcharge. For installment-mode invoices the client payment status is
//! derived from the installment set; lump-sum invoices are toggled
//! directly. Installment generation happens after the invoice row commits
//! and its failure is deliberately non-fatal, so a party is never blocked
//! from existing because its payment plan could not be written.

use crate::{
    core::status::{ClientPaymentStatus, InstallmentStatus, PaymentMode},
    entities::{
        Installment, InstallmentColumn, Invoice, InvoiceColumn, LineItem, LineItemColumn, Party,
        installment, invoice, line_item,
    },
    errors::{Error, Result},
};
use sea_orm::{IntoActiveModel, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, warn};

/// One billable line supplied by the caller when creating or editing an invoice.
#[derive(Debug, Clone)]
pub struct LineItemInput {
    /// Description of the billed item or service
    pub description: String,
    /// Quantity billed
    pub quantity: f64,
    /// Price per unit
    pub unit_price: f64,
}

/// Result of creating an invoice.
///
/// `installment_warning` carries the non-fatal failure message when the
/// invoice itself was persisted but its installment plan could not be.
#[derive(Debug)]
pub struct InvoiceCreation {
    /// The persisted invoice
    pub invoice: invoice::Model,
    /// The generated installment plan (empty for lump-sum invoices)
    pub installments: Vec<installment::Model>,
    /// Set when installment generation failed after the invoice committed
    pub installment_warning: Option<String>,
}

/// Computes an invoice total from its inputs.
///
/// Pure function: sum of quantity x unit price over the line items, minus
/// discount, plus surcharge.
#[must_use]
pub fn compute_total(items: &[LineItemInput], discount: f64, surcharge: f64) -> f64 {
    let items_sum: f64 = items.iter().map(|i| i.quantity * i.unit_price).sum();
    items_sum - discount + surcharge
}

/// Creates the invoice for a party, together with its line items and - for
/// installment mode - its payment plan.
///
/// At most one invoice may exist per party. The invoice row and its line
/// items commit in one transaction; installment generation runs afterwards
/// and reports failure through `installment_warning` instead of rolling the
/// invoice back.
#[allow(clippy::too_many_arguments)]
pub async fn create_invoice(
    db: &DatabaseConnection,
    party_id: i64,
    items: Vec<LineItemInput>,
    discount: f64,
    surcharge: f64,
    payment_mode: PaymentMode,
    installment_count: i32,
    down_payment: f64,
) -> Result<InvoiceCreation> {
    let party = Party::find_by_id(party_id)
        .one(db)
        .await?
        .ok_or(Error::PartyNotFound { id: party_id })?;

    if get_invoice_for_party(db, party_id).await?.is_some() {
        return Err(Error::Config {
            message: format!("Party {party_id} already has an invoice"),
        });
    }

    let total = compute_total(&items, discount, surcharge);
    validate_invoice_inputs(total, discount, surcharge, down_payment, installment_count)?;

    let txn = db.begin().await?;

    let invoice_row = invoice::ActiveModel {
        party_id: Set(party_id),
        discount: Set(discount),
        surcharge: Set(surcharge),
        total: Set(total),
        payment_mode: Set(payment_mode.as_str().to_string()),
        installment_count: Set(installment_count),
        down_payment: Set(down_payment),
        payment_status: Set(ClientPaymentStatus::Pending.as_str().to_string()),
        ..Default::default()
    };
    let invoice_row = invoice_row.insert(&txn).await?;

    for item in &items {
        let line = line_item::ActiveModel {
            invoice_id: Set(invoice_row.id),
            description: Set(item.description.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            ..Default::default()
        };
        line.insert(&txn).await?;
    }

    txn.commit().await?;
    info!(party_id, invoice_id = invoice_row.id, total, "Created invoice");

    // Installment generation is a separate step so its failure never undoes
    // the committed invoice - the party and invoice exist either way.
    let (installments, installment_warning) =
        match crate::core::installment::generate_installments(db, &invoice_row, &party.event_date)
            .await
        {
            Ok(plan) => (plan, None),
            Err(e) => {
                warn!(
                    invoice_id = invoice_row.id,
                    error = %e,
                    "Invoice saved but installment generation failed"
                );
                (Vec::new(), Some(e.to_string()))
            }
        };

    Ok(InvoiceCreation {
        invoice: invoice_row,
        installments,
        installment_warning,
    })
}

/// Finds the invoice for a party, if one exists.
pub async fn get_invoice_for_party(
    db: &DatabaseConnection,
    party_id: i64,
) -> Result<Option<invoice::Model>> {
    Invoice::find()
        .filter(InvoiceColumn::PartyId.eq(party_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the line items of an invoice in insertion order.
pub async fn get_line_items(
    db: &DatabaseConnection,
    invoice_id: i64,
) -> Result<Vec<line_item::Model>> {
    LineItem::find()
        .filter(LineItemColumn::InvoiceId.eq(invoice_id))
        .order_by_asc(LineItemColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces an invoice's line items, discount, and surcharge, recomputing
/// the total from the new inputs.
///
/// The existing installment plan is left alone: amortization was agreed at
/// booking time and re-cutting paid installments would corrupt history.
pub async fn update_invoice_items(
    db: &DatabaseConnection,
    invoice_id: i64,
    items: Vec<LineItemInput>,
    discount: f64,
    surcharge: f64,
) -> Result<invoice::Model> {
    let invoice_row = Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;

    let total = compute_total(&items, discount, surcharge);
    validate_invoice_inputs(
        total,
        discount,
        surcharge,
        invoice_row.down_payment,
        invoice_row.installment_count,
    )?;

    let txn = db.begin().await?;

    LineItem::delete_many()
        .filter(LineItemColumn::InvoiceId.eq(invoice_id))
        .exec(&txn)
        .await?;
    for item in &items {
        let line = line_item::ActiveModel {
            invoice_id: Set(invoice_id),
            description: Set(item.description.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            ..Default::default()
        };
        line.insert(&txn).await?;
    }

    let mut active = invoice_row.into_active_model();
    active.discount = Set(discount);
    active.surcharge = Set(surcharge);
    active.total = Set(total);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    debug!(invoice_id, total, "Rebuilt invoice line items");
    Ok(updated)
}

/// Marks a lump-sum invoice paid or unpaid.
///
/// Guarded toggle in the same spirit as the staff payment toggle; rejects
/// installment-mode invoices, whose status is derived from their plan.
pub async fn set_lump_sum_paid(
    db: &DatabaseConnection,
    invoice_id: i64,
    paid: bool,
) -> Result<invoice::Model> {
    let invoice_row = Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;

    if PaymentMode::parse(&invoice_row.payment_mode)? != PaymentMode::LumpSum {
        return Err(Error::Config {
            message: "Installment-mode invoices derive their status from the plan".to_string(),
        });
    }

    let next = if paid {
        ClientPaymentStatus::FullyPaid
    } else {
        ClientPaymentStatus::Pending
    };
    if invoice_row.payment_status == next.as_str() {
        return Ok(invoice_row);
    }

    let mut active = invoice_row.into_active_model();
    active.payment_status = Set(next.as_str().to_string());
    let updated = active.update(db).await?;
    info!(invoice_id, paid, "Toggled lump-sum invoice payment");
    Ok(updated)
}

/// Recomputes an installment-mode invoice's payment status from its plan
/// and persists it.
///
/// All installments paid means `fully_paid`, at least one means
/// `partially_paid`, none means `pending`. The down payment is treated as
/// received at booking time and does not affect this classification.
pub async fn refresh_invoice_payment_status(
    db: &DatabaseConnection,
    invoice_id: i64,
) -> Result<ClientPaymentStatus> {
    let invoice_row = Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;

    if PaymentMode::parse(&invoice_row.payment_mode)? != PaymentMode::Installments {
        return ClientPaymentStatus::parse(&invoice_row.payment_status);
    }

    let installments = Installment::find()
        .filter(InstallmentColumn::InvoiceId.eq(invoice_id))
        .all(db)
        .await?;

    let paid_count = installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Paid.as_str())
        .count();

    let status = if installments.is_empty() || paid_count == 0 {
        ClientPaymentStatus::Pending
    } else if paid_count == installments.len() {
        ClientPaymentStatus::FullyPaid
    } else {
        ClientPaymentStatus::PartiallyPaid
    };

    if invoice_row.payment_status != status.as_str() {
        let mut active = invoice_row.into_active_model();
        active.payment_status = Set(status.as_str().to_string());
        active.update(db).await?;
        debug!(invoice_id, status = status.as_str(), "Refreshed invoice payment status");
    }

    Ok(status)
}

/// The client-payment status of a party, read from its invoice.
///
/// A party with no invoice yet counts as `pending`: nothing has been
/// billed, so the client side cannot be considered settled.
pub async fn client_payment_status(
    db: &DatabaseConnection,
    party_id: i64,
) -> Result<ClientPaymentStatus> {
    match get_invoice_for_party(db, party_id).await? {
        Some(invoice_row) => ClientPaymentStatus::parse(&invoice_row.payment_status),
        None => Ok(ClientPaymentStatus::Pending),
    }
}

/// Rejects invoice inputs that cannot describe a real bill.
fn validate_invoice_inputs(
    total: f64,
    discount: f64,
    surcharge: f64,
    down_payment: f64,
    installment_count: i32,
) -> Result<()> {
    for amount in [total, discount, surcharge, down_payment] {
        if !amount.is_finite() {
            return Err(Error::InvalidAmount { amount });
        }
    }
    if total < 0.0 {
        return Err(Error::InvalidAmount { amount: total });
    }
    if discount < 0.0 {
        return Err(Error::InvalidAmount { amount: discount });
    }
    if surcharge < 0.0 {
        return Err(Error::InvalidAmount { amount: surcharge });
    }
    if down_payment < 0.0 || down_payment > total {
        return Err(Error::InvalidAmount { amount: down_payment });
    }
    if installment_count < 1 {
        return Err(Error::Config {
            message: format!("Installment count must be at least 1, got {installment_count}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{create_test_party, setup_test_db};

    fn items(specs: &[(&str, f64, f64)]) -> Vec<LineItemInput> {
        specs
            .iter()
            .map(|(d, q, p)| LineItemInput {
                description: (*d).to_string(),
                quantity: *q,
                unit_price: *p,
            })
            .collect()
    }

    #[test]
    fn test_compute_total() {
        let lines = items(&[("buffet", 50.0, 18.0), ("bar", 1.0, 300.0)]);
        // 900 + 300 - 100 + 50
        assert_eq!(compute_total(&lines, 100.0, 50.0), 1150.0);
        assert_eq!(compute_total(&[], 0.0, 0.0), 0.0);
    }

    #[tokio::test]
    async fn test_create_lump_sum_invoice() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Castro baptism", "2025-11-02", None).await?;

        let creation = create_invoice(
            &db,
            party.id,
            items(&[("buffet", 30.0, 20.0)]),
            0.0,
            0.0,
            PaymentMode::LumpSum,
            1,
            0.0,
        )
        .await?;

        assert_eq!(creation.invoice.total, 600.0);
        assert_eq!(creation.invoice.payment_status, "pending");
        assert!(creation.installments.is_empty());
        assert!(creation.installment_warning.is_none());

        let lines = get_line_items(&db, creation.invoice.id).await?;
        assert_eq!(lines.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_one_invoice_per_party() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Castro baptism", "2025-11-02", None).await?;

        create_invoice(
            &db,
            party.id,
            items(&[("buffet", 1.0, 100.0)]),
            0.0,
            0.0,
            PaymentMode::LumpSum,
            1,
            0.0,
        )
        .await?;

        let second = create_invoice(
            &db,
            party.id,
            items(&[("bar", 1.0, 100.0)]),
            0.0,
            0.0,
            PaymentMode::LumpSum,
            1,
            0.0,
        )
        .await;
        assert!(matches!(second, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_invoice_input_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Castro baptism", "2025-11-02", None).await?;

        // Down payment larger than the total
        let result = create_invoice(
            &db,
            party.id,
            items(&[("buffet", 1.0, 100.0)]),
            0.0,
            0.0,
            PaymentMode::Installments,
            3,
            500.0,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        // Discount pushing the total negative
        let result = create_invoice(
            &db,
            party.id,
            items(&[("buffet", 1.0, 100.0)]),
            200.0,
            0.0,
            PaymentMode::LumpSum,
            1,
            0.0,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        // Zero installments
        let result = create_invoice(
            &db,
            party.id,
            items(&[("buffet", 1.0, 100.0)]),
            0.0,
            0.0,
            PaymentMode::Installments,
            0,
            0.0,
        )
        .await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_items_recomputes_total() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Castro baptism", "2025-11-02", None).await?;
        let creation = create_invoice(
            &db,
            party.id,
            items(&[("buffet", 1.0, 100.0)]),
            0.0,
            0.0,
            PaymentMode::LumpSum,
            1,
            0.0,
        )
        .await?;

        let updated = update_invoice_items(
            &db,
            creation.invoice.id,
            items(&[("buffet", 2.0, 100.0), ("cake", 1.0, 80.0)]),
            30.0,
            10.0,
        )
        .await?;
        assert_eq!(updated.total, 260.0);

        let lines = get_line_items(&db, creation.invoice.id).await?;
        assert_eq!(lines.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_lump_sum_toggle() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Castro baptism", "2025-11-02", None).await?;
        let creation = create_invoice(
            &db,
            party.id,
            items(&[("buffet", 1.0, 100.0)]),
            0.0,
            0.0,
            PaymentMode::LumpSum,
            1,
            0.0,
        )
        .await?;

        let paid = set_lump_sum_paid(&db, creation.invoice.id, true).await?;
        assert_eq!(paid.payment_status, "fully_paid");

        let unpaid = set_lump_sum_paid(&db, creation.invoice.id, false).await?;
        assert_eq!(unpaid.payment_status, "pending");

        assert_eq!(
            client_payment_status(&db, party.id).await?,
            ClientPaymentStatus::Pending
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_lump_sum_toggle_rejects_installment_mode() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Castro baptism", "2025-11-02", None).await?;
        let creation = create_invoice(
            &db,
            party.id,
            items(&[("buffet", 1.0, 1000.0)]),
            0.0,
            0.0,
            PaymentMode::Installments,
            4,
            200.0,
        )
        .await?;

        let result = set_lump_sum_paid(&db, creation.invoice.id, true).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_invoice_means_client_pending() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Castro baptism", "2025-11-02", None).await?;
        assert_eq!(
            client_payment_status(&db, party.id).await?,
            ClientPaymentStatus::Pending
        );
        Ok(())
    }
}
