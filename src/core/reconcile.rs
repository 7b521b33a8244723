//! Reconciliation orchestration.
//!
//! Two triggers keep party statuses consistent with reality. Payment events
//! run [`on_payment_event`] immediately: the freelancer aggregate is
//! recomputed and persisted first, then the pending->ended check runs
//! against that fresh value. Time-driven transitions are picked up by the
//! batch pass ([`auto_update_statuses`]), which the scheduler invokes on a
//! fixed tick. Within a batch every party is its own unit of work: a store
//! failure or an unparseable date on one party is logged and counted, and
//! the pass moves on to the next.

use crate::{
    core::{
        invoice,
        payment,
        status::{self, FreelancerPaymentStatus, PartyStatus},
    },
    entities::party,
    errors::{Error, Result},
};
use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument, warn};

/// One party's status change during a reconciliation pass.
#[derive(Debug, Clone)]
pub struct PartyReconcileRecord {
    /// ID of the reconciled party
    pub party_id: i64,
    /// Client the party is booked for
    pub client_name: String,
    /// Status before the pass
    pub from: String,
    /// Status after the pass
    pub to: String,
}

/// Summary of a batch reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// Number of parties examined
    pub examined: usize,
    /// Parties whose status changed, with before/after
    pub updated: Vec<PartyReconcileRecord>,
    /// Parties skipped because their stored data would not parse
    pub skipped: usize,
    /// Parties whose reconciliation hit a store failure
    pub failed: usize,
}

/// Reconciles one party after a payment event.
///
/// Recomputes and persists the freelancer aggregate, then re-checks the
/// payment-gated pending->ended transition with the invoice's current
/// status. The aggregate write always completes before the check reads it.
/// The time-based check is never run here - that belongs to the scheduler
/// tick.
#[instrument(skip(db))]
pub async fn on_payment_event(db: &DatabaseConnection, party_id: i64) -> Result<PartyStatus> {
    let freelancer = payment::refresh_party_freelancer_status(db, party_id).await?;
    let client = invoice::client_payment_status(db, party_id).await?;

    let party = crate::core::party::get_party_by_id(db, party_id)
        .await?
        .ok_or(Error::PartyNotFound { id: party_id })?;

    status::reconcile_pending_to_ended(db, &party, client, freelancer).await
}

/// Runs the status checks over a set of parties.
///
/// `confirmed` parties get the time-based check against `now`;
/// `ended_pending` parties get the payment-gated check. Parties in any
/// other status pass through untouched. Failures never abort the batch.
pub async fn reconcile_parties(
    db: &DatabaseConnection,
    parties: &[party::Model],
    now: NaiveDateTime,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome {
        examined: parties.len(),
        ..Default::default()
    };

    for party in parties {
        match reconcile_one(db, party, now).await {
            Ok(Some(record)) => outcome.updated.push(record),
            Ok(None) => {}
            Err(Error::InvalidDate { value }) => {
                warn!(
                    party_id = party.id,
                    value, "Skipping party with unparseable schedule data"
                );
                outcome.skipped += 1;
            }
            Err(Error::UnknownStatus { value }) => {
                warn!(
                    party_id = party.id,
                    value, "Skipping party with unknown stored status"
                );
                outcome.skipped += 1;
            }
            Err(e) => {
                warn!(party_id = party.id, error = %e, "Failed to reconcile party");
                outcome.failed += 1;
            }
        }
    }

    if !outcome.updated.is_empty() {
        info!(
            updated = outcome.updated.len(),
            examined = outcome.examined,
            "Reconciliation pass advanced party statuses"
        );
    }
    outcome
}

/// Applies whichever check matches one party's current status.
async fn reconcile_one(
    db: &DatabaseConnection,
    party: &party::Model,
    now: NaiveDateTime,
) -> Result<Option<PartyReconcileRecord>> {
    let current = PartyStatus::parse(&party.status)?;
    let next = match current {
        PartyStatus::Confirmed => {
            let client = invoice::client_payment_status(db, party.id).await?;
            let freelancer = FreelancerPaymentStatus::parse(&party.freelancer_payment_status)?;
            status::reconcile_time_based_status(db, party, client, freelancer, now).await?
        }
        PartyStatus::EndedPending => {
            let client = invoice::client_payment_status(db, party.id).await?;
            let freelancer = FreelancerPaymentStatus::parse(&party.freelancer_payment_status)?;
            status::reconcile_pending_to_ended(db, party, client, freelancer).await?
        }
        _ => current,
    };

    if next == current {
        return Ok(None);
    }
    Ok(Some(PartyReconcileRecord {
        party_id: party.id,
        client_name: party.client_name.clone(),
        from: current.as_str().to_string(),
        to: next.as_str().to_string(),
    }))
}

/// Loads every party that could still advance and reconciles it.
///
/// This is the scheduler's entry point: all active `confirmed` and
/// `ended_pending` parties, checked against `now`.
pub async fn auto_update_statuses(
    db: &DatabaseConnection,
    now: NaiveDateTime,
) -> Result<ReconcileOutcome> {
    let parties = crate::core::party::get_parties_with_statuses(
        db,
        &[PartyStatus::Confirmed, PartyStatus::EndedPending],
    )
    .await?;

    Ok(reconcile_parties(db, &parties, now).await)
}

/// Re-checks the payment-gated transition for every `ended_pending` party.
///
/// Returns how many parties moved to `ended`. Per-party failures are
/// logged and do not stop the sweep.
pub async fn check_and_update_payments_complete(db: &DatabaseConnection) -> Result<usize> {
    let parties =
        crate::core::party::get_parties_with_statuses(db, &[PartyStatus::EndedPending]).await?;

    let mut updated = 0;
    for party in &parties {
        let result = async {
            let client = invoice::client_payment_status(db, party.id).await?;
            let freelancer = FreelancerPaymentStatus::parse(&party.freelancer_payment_status)?;
            status::reconcile_pending_to_ended(db, party, client, freelancer).await
        }
        .await;

        match result {
            Ok(PartyStatus::Ended) => updated += 1,
            Ok(_) => {}
            Err(e) => {
                warn!(party_id = party.id, error = %e, "Failed to re-check party payments");
            }
        }
    }
    Ok(updated)
}

/// Toggles a staff payment and reconciles the owning party.
///
/// This is the operation behind the "mark freelancer paid" user action, so
/// its failure is reported back to the caller rather than swallowed.
pub async fn record_staff_payment(
    db: &DatabaseConnection,
    assignment_id: i64,
    paid: bool,
) -> Result<PartyStatus> {
    let assignment = payment::set_staff_payment_status(db, assignment_id, paid).await?;
    on_payment_event(db, assignment.party_id).await
}

/// Marks an installment paid and reconciles the owning party.
pub async fn record_installment_payment(
    db: &DatabaseConnection,
    installment_id: i64,
    payment_method: Option<String>,
) -> Result<PartyStatus> {
    let installment =
        crate::core::installment::mark_installment_paid(db, installment_id, payment_method).await?;
    invoice::refresh_invoice_payment_status(db, installment.invoice_id).await?;
    on_payment_event(db, installment.party_id).await
}

/// Toggles a lump-sum invoice payment and reconciles the owning party.
pub async fn record_lump_sum_payment(
    db: &DatabaseConnection,
    invoice_id: i64,
    paid: bool,
) -> Result<PartyStatus> {
    let invoice_row = invoice::set_lump_sum_paid(db, invoice_id, paid).await?;
    on_payment_event(db, invoice_row.party_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::invoice::LineItemInput;
    use crate::core::status::PaymentMode;
    use crate::test_utils::{
        confirm_test_party, create_test_assignment, create_test_invoice, create_test_party,
        set_party_status, setup_test_db,
    };
    use chrono::NaiveDateTime;
    use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn buffet(price: f64) -> Vec<LineItemInput> {
        vec![LineItemInput {
            description: "Buffet".to_string(),
            quantity: 1.0,
            unit_price: price,
        }]
    }

    #[tokio::test]
    async fn test_confirmed_party_past_end_goes_pending() -> Result<()> {
        let db = setup_test_db().await?;
        // Confirmed yesterday-style party with an unpaid invoice
        let party = create_test_party(&db, "Silva wedding", "2025-06-10", None).await?;
        let party = confirm_test_party(&db, party).await?;
        create_test_invoice(&db, party.id, buffet(500.0), PaymentMode::LumpSum, 1, 0.0).await?;

        let outcome = reconcile_parties(&db, &[party.clone()], dt("2025-06-11T09:00:00")).await;
        assert_eq!(outcome.examined, 1);
        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.updated[0].from, "confirmed");
        assert_eq!(outcome.updated[0].to, "ended_pending");

        let stored = crate::entities::Party::find_by_id(party.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(stored.status, "ended_pending");
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_skips_malformed_dates_and_continues() -> Result<()> {
        let db = setup_test_db().await?;

        let broken = create_test_party(&db, "broken", "2025-06-10", None).await?;
        let broken = confirm_test_party(&db, broken).await?;
        let mut corrupt = broken.clone().into_active_model();
        corrupt.event_date = Set("not-a-date".to_string());
        let broken = corrupt.update(&db).await?;

        let healthy = create_test_party(&db, "healthy", "2025-06-10", None).await?;
        let healthy = confirm_test_party(&db, healthy).await?;

        let outcome =
            reconcile_parties(&db, &[broken, healthy.clone()], dt("2025-06-11T09:00:00")).await;
        assert_eq!(outcome.examined, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.updated[0].party_id, healthy.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_auto_update_only_touches_eligible_statuses() -> Result<()> {
        let db = setup_test_db().await?;

        // Planning party in the past must not move
        let planning = create_test_party(&db, "planning", "2020-01-01", None).await?;
        // Confirmed party in the future must not move either
        let future = create_test_party(&db, "future", "2030-01-01", None).await?;
        confirm_test_party(&db, future).await?;
        // Confirmed party in the past moves
        let past = create_test_party(&db, "past", "2025-06-10", None).await?;
        let past = confirm_test_party(&db, past).await?;

        let outcome = auto_update_statuses(&db, dt("2025-06-11T09:00:00")).await?;
        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.updated[0].party_id, past.id);

        let stored = crate::entities::Party::find_by_id(planning.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(stored.status, "planning");
        Ok(())
    }

    #[tokio::test]
    async fn test_fully_settled_party_ends_directly() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Silva wedding", "2025-06-10", Some("20:00")).await?;
        let party = confirm_test_party(&db, party).await?;

        // Lump-sum invoice already settled, no staff assigned
        let creation =
            create_test_invoice(&db, party.id, buffet(500.0), PaymentMode::LumpSum, 1, 0.0).await?;
        invoice::set_lump_sum_paid(&db, creation.invoice.id, true).await?;

        let outcome = auto_update_statuses(&db, dt("2025-06-10T20:00:00")).await?;
        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.updated[0].to, "ended");
        Ok(())
    }

    #[tokio::test]
    async fn test_last_staff_payment_closes_pending_party() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Silva wedding", "2025-06-10", None).await?;
        let a = create_test_assignment(&db, party.id, "Ana", 150.0, 0.0).await?;
        let b = create_test_assignment(&db, party.id, "Bruno", 150.0, 0.0).await?;

        // Client side fully settled
        let creation =
            create_test_invoice(&db, party.id, buffet(800.0), PaymentMode::LumpSum, 1, 0.0).await?;
        invoice::set_lump_sum_paid(&db, creation.invoice.id, true).await?;

        // Party already past its event, one of two staff paid
        record_staff_payment(&db, a.id, true).await?;
        let party = crate::entities::Party::find_by_id(party.id)
            .one(&db)
            .await?
            .unwrap();
        let party = set_party_status(&db, party, "ended_pending").await?;
        assert_eq!(party.freelancer_payment_status, "partial");

        // Paying the last assignment flips the aggregate and closes the party
        let status = record_staff_payment(&db, b.id, true).await?;
        assert_eq!(status, PartyStatus::Ended);

        let stored = crate::entities::Party::find_by_id(party.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(stored.status, "ended");
        assert_eq!(stored.freelancer_payment_status, "paid");
        Ok(())
    }

    #[tokio::test]
    async fn test_installment_payments_drive_invoice_and_party() -> Result<()> {
        let db = setup_test_db().await?;
        let party = create_test_party(&db, "Silva wedding", "2025-06-10", None).await?;
        let creation = create_test_invoice(
            &db,
            party.id,
            buffet(1000.0),
            PaymentMode::Installments,
            2,
            0.0,
        )
        .await?;
        let party = crate::entities::Party::find_by_id(party.id)
            .one(&db)
            .await?
            .unwrap();
        let party = set_party_status(&db, party, "ended_pending").await?;

        let first = creation.installments[0].id;
        let second = creation.installments[1].id;

        let status = record_installment_payment(&db, first, Some("pix".to_string())).await?;
        assert_eq!(status, PartyStatus::EndedPending);
        assert_eq!(
            invoice::client_payment_status(&db, party.id).await?,
            crate::core::status::ClientPaymentStatus::PartiallyPaid
        );

        let status = record_installment_payment(&db, second, Some("pix".to_string())).await?;
        assert_eq!(status, PartyStatus::Ended);
        assert_eq!(
            invoice::client_payment_status(&db, party.id).await?,
            crate::core::status::ClientPaymentStatus::FullyPaid
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_check_and_update_payments_complete_counts() -> Result<()> {
        let db = setup_test_db().await?;

        // Settled pending party - will close
        let done = create_test_party(&db, "done", "2025-06-10", None).await?;
        let creation =
            create_test_invoice(&db, done.id, buffet(300.0), PaymentMode::LumpSum, 1, 0.0).await?;
        invoice::set_lump_sum_paid(&db, creation.invoice.id, true).await?;
        let done = crate::entities::Party::find_by_id(done.id)
            .one(&db)
            .await?
            .unwrap();
        set_party_status(&db, done, "ended_pending").await?;

        // Unsettled pending party - stays
        let waiting = create_test_party(&db, "waiting", "2025-06-10", None).await?;
        create_test_invoice(&db, waiting.id, buffet(300.0), PaymentMode::LumpSum, 1, 0.0).await?;
        let waiting = crate::entities::Party::find_by_id(waiting.id)
            .one(&db)
            .await?
            .unwrap();
        set_party_status(&db, waiting, "ended_pending").await?;

        let updated = check_and_update_payments_complete(&db).await?;
        assert_eq!(updated, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_on_payment_event_missing_party() -> Result<()> {
        let db = setup_test_db().await?;
        let result = on_payment_event(&db, 123).await;
        assert!(matches!(result, Err(Error::PartyNotFound { id: 123 })));
        Ok(())
    }
}
