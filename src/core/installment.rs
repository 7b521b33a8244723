//! Installment scheduling and amortization.
//!
//! An installment-mode invoice finances `total - down_payment` across N
//! monthly installments starting on the event date. Amounts are rounded to
//! cents and the final installment absorbs the rounding drift, so the plan
//! always sums exactly to the financed amount. Due dates use calendar-month
//! arithmetic with end-of-month clamping, not fixed 30-day hops.

use crate::{
    core::status::{InstallmentStatus, PaymentMode},
    entities::{Installment, InstallmentColumn, installment, invoice},
    errors::{Error, Result},
};
use chrono::{Local, Months, NaiveDate};
use sea_orm::{IntoActiveModel, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// Display-time classification of an installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentDisplayStatus {
    /// Not yet due, or due today
    Pending,
    /// Pending and past its due date
    Overdue,
    /// Paid
    Paid,
}

/// Rounds an amount to whole cents.
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Generates the installment plan for an invoice in one batch.
///
/// Lump-sum invoices and single-installment plans generate nothing (the
/// invoice's own payment status covers those). Installment `i` is due
/// `i - 1` calendar months after the event date. Each amount is rounded to
/// cents; the final installment is adjusted so the plan sums exactly to
/// the financed amount.
pub async fn generate_installments(
    db: &DatabaseConnection,
    invoice_row: &invoice::Model,
    event_date: &str,
) -> Result<Vec<installment::Model>> {
    if PaymentMode::parse(&invoice_row.payment_mode)? != PaymentMode::Installments
        || invoice_row.installment_count <= 1
    {
        return Ok(Vec::new());
    }

    let count = invoice_row.installment_count;
    let start = NaiveDate::parse_from_str(event_date, "%Y-%m-%d").map_err(|_| {
        Error::InvalidDate {
            value: event_date.to_string(),
        }
    })?;

    let amount_to_finance = invoice_row.total - invoice_row.down_payment;
    let per_installment = round_cents(amount_to_finance / f64::from(count));
    // The last installment absorbs whatever cent-rounding left over
    let final_installment =
        round_cents(amount_to_finance - per_installment * f64::from(count - 1));

    let txn = db.begin().await?;
    let mut plan = Vec::with_capacity(usize::try_from(count)?);

    for seq in 1..=count {
        let due = start
            .checked_add_months(Months::new(u32::try_from(seq - 1)?))
            .ok_or_else(|| Error::InvalidDate {
                value: event_date.to_string(),
            })?;
        let amount = if seq == count {
            final_installment
        } else {
            per_installment
        };

        let row = installment::ActiveModel {
            invoice_id: Set(invoice_row.id),
            party_id: Set(invoice_row.party_id),
            sequence_no: Set(seq),
            amount: Set(amount),
            due_date: Set(due.format("%Y-%m-%d").to_string()),
            status: Set(InstallmentStatus::Pending.as_str().to_string()),
            payment_date: Set(None),
            payment_method: Set(None),
            notes: Set(None),
            ..Default::default()
        };
        plan.push(row.insert(&txn).await?);
    }

    txn.commit().await?;
    info!(
        invoice_id = invoice_row.id,
        count,
        financed = amount_to_finance,
        "Generated installment plan"
    );
    Ok(plan)
}

/// Finds an installment by its unique ID.
pub async fn get_installment_by_id(
    db: &DatabaseConnection,
    installment_id: i64,
) -> Result<Option<installment::Model>> {
    Installment::find_by_id(installment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an invoice's installments ordered by sequence number.
pub async fn get_installments_for_invoice(
    db: &DatabaseConnection,
    invoice_id: i64,
) -> Result<Vec<installment::Model>> {
    Installment::find()
        .filter(InstallmentColumn::InvoiceId.eq(invoice_id))
        .order_by_asc(InstallmentColumn::SequenceNo)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks an installment paid.
///
/// Guarded: an already-paid installment is returned unchanged. An overdue
/// installment can be paid like any other - overdue is only a display
/// classification. Records today's date and the payment method used.
pub async fn mark_installment_paid(
    db: &DatabaseConnection,
    installment_id: i64,
    payment_method: Option<String>,
) -> Result<installment::Model> {
    let row = get_installment_by_id(db, installment_id)
        .await?
        .ok_or(Error::InstallmentNotFound { id: installment_id })?;

    if InstallmentStatus::parse(&row.status)? == InstallmentStatus::Paid {
        debug!(installment_id, "Installment already paid");
        return Ok(row);
    }

    let mut active = row.into_active_model();
    active.status = Set(InstallmentStatus::Paid.as_str().to_string());
    active.payment_date = Set(Some(Local::now().date_naive().format("%Y-%m-%d").to_string()));
    active.payment_method = Set(payment_method);
    let updated = active.update(db).await?;
    info!(installment_id, "Marked installment paid");
    Ok(updated)
}

/// Reverts a paid installment to pending, clearing its payment details.
pub async fn mark_installment_unpaid(
    db: &DatabaseConnection,
    installment_id: i64,
) -> Result<installment::Model> {
    let row = get_installment_by_id(db, installment_id)
        .await?
        .ok_or(Error::InstallmentNotFound { id: installment_id })?;

    if InstallmentStatus::parse(&row.status)? == InstallmentStatus::Pending {
        return Ok(row);
    }

    let mut active = row.into_active_model();
    active.status = Set(InstallmentStatus::Pending.as_str().to_string());
    active.payment_date = Set(None);
    active.payment_method = Set(None);
    let updated = active.update(db).await?;
    info!(installment_id, "Reverted installment to pending");
    Ok(updated)
}

/// Classifies an installment for display.
///
/// A pending installment strictly past its due date shows as overdue; this
/// is never written back to the row. An unparseable due date is shown as
/// plain pending rather than guessed at.
#[must_use]
pub fn classify(row: &installment::Model, today: NaiveDate) -> InstallmentDisplayStatus {
    if row.status == InstallmentStatus::Paid.as_str() {
        return InstallmentDisplayStatus::Paid;
    }
    match NaiveDate::parse_from_str(&row.due_date, "%Y-%m-%d") {
        Ok(due) if due < today => InstallmentDisplayStatus::Overdue,
        _ => InstallmentDisplayStatus::Pending,
    }
}
