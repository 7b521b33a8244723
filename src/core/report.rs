//! Financial report generation for a single party.
//!
//! Pure projection over the party's assignments, payments, invoice, and
//! installment plan - nothing here mutates state. The report is structured
//! data for whatever front end sits on top of this crate to format.

use crate::{
    core::{
        installment::{self, InstallmentDisplayStatus},
        status::{ClientPaymentStatus, PaymentMode, StaffPaymentStatus},
    },
    entities::{installment as installment_entity, invoice, party, staff_assignment},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Money position of one party across both payment sides.
#[derive(Debug, Clone)]
pub struct PartyFinancialReport {
    /// The party being reported on
    pub party: party::Model,
    /// Total agreed with staff (base + bonus over all assignments)
    pub staff_total: f64,
    /// Portion of `staff_total` already paid out
    pub staff_paid: f64,
    /// Portion of `staff_total` still owed
    pub staff_outstanding: f64,
    /// Invoice total, or 0.0 when no invoice exists yet
    pub invoice_total: f64,
    /// Amount received from the client so far
    pub client_received: f64,
    /// Amount the client still owes
    pub client_outstanding: f64,
    /// Installments currently showing as overdue
    pub overdue_installments: usize,
    /// The party's staff assignments
    pub assignments: Vec<staff_assignment::Model>,
    /// The party's installment plan (empty for lump-sum billing)
    pub installments: Vec<installment_entity::Model>,
}

/// Builds the financial report for a party as of `today`.
///
/// `today` only affects the overdue classification of pending
/// installments, so callers (and tests) control the reference date.
pub async fn generate_party_report(
    db: &DatabaseConnection,
    party_id: i64,
    today: NaiveDate,
) -> Result<PartyFinancialReport> {
    let party = crate::core::party::get_party_by_id(db, party_id)
        .await?
        .ok_or(Error::PartyNotFound { id: party_id })?;

    let assignments = crate::core::staff::get_assignments_for_party(db, party_id).await?;
    let staff_total: f64 = assignments
        .iter()
        .map(|a| a.base_amount + a.bonus_amount)
        .sum();
    let staff_paid: f64 = assignments
        .iter()
        .filter(|a| a.payment_status == StaffPaymentStatus::Paid.as_str())
        .map(|a| a.base_amount + a.bonus_amount)
        .sum();

    let invoice_row = crate::core::invoice::get_invoice_for_party(db, party_id).await?;
    let (invoice_total, client_received, installments) = match &invoice_row {
        Some(inv) => client_position(db, inv).await?,
        None => (0.0, 0.0, Vec::new()),
    };

    let overdue_installments = installments
        .iter()
        .filter(|i| installment::classify(i, today) == InstallmentDisplayStatus::Overdue)
        .count();

    Ok(PartyFinancialReport {
        party,
        staff_total,
        staff_paid,
        staff_outstanding: staff_total - staff_paid,
        invoice_total,
        client_received,
        client_outstanding: invoice_total - client_received,
        overdue_installments,
        assignments,
        installments,
    })
}

/// Computes what the client has paid so far on an invoice.
///
/// Installment mode counts the down payment (received at booking) plus
/// every paid installment; lump sum counts the full total once the
/// invoice is marked fully paid.
async fn client_position(
    db: &DatabaseConnection,
    inv: &invoice::Model,
) -> Result<(f64, f64, Vec<installment_entity::Model>)> {
    match PaymentMode::parse(&inv.payment_mode)? {
        PaymentMode::Installments => {
            let installments =
                crate::core::installment::get_installments_for_invoice(db, inv.id).await?;
            let paid_sum: f64 = installments
                .iter()
                .filter(|i| i.status == crate::core::status::InstallmentStatus::Paid.as_str())
                .map(|i| i.amount)
                .sum();
            Ok((inv.total, inv.down_payment + paid_sum, installments))
        }
        PaymentMode::LumpSum => {
            let received = if inv.payment_status == ClientPaymentStatus::FullyPaid.as_str() {
                inv.total
            } else {
                0.0
            };
            Ok((inv.total, received, Vec::new()))
        }
    }
}
