//! Payment aggregation business logic.
//!
//! A party's freelancer-payment status is a projection over its staff
//! assignment set: [`compute_freelancer_payment_status`] is the single
//! place that projection is defined, and every mutation of the assignment
//! set funnels through [`refresh_party_freelancer_status`] to keep the
//! cached column on the party row in sync. Marking an assignment paid or
//! unpaid is a guarded state transition that creates or deletes the
//! matching payment record in the same database transaction.

use crate::{
    core::status::{FreelancerPaymentStatus, StaffPaymentStatus},
    entities::{
        Party, Payment, PaymentColumn, StaffAssignment, party, payment, staff_assignment,
    },
    errors::{Error, Result},
};
use chrono::Local;
use sea_orm::{IntoActiveModel, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// Derives the aggregate freelancer-payment status from a party's full
/// assignment set.
///
/// An empty set counts as `Paid`: with no staff assigned there is nothing
/// owed, so the party is fully settled on the freelancer side. This is
/// deliberate, not an oversight.
///
/// Pure function - no I/O, no hidden state.
#[must_use]
pub fn compute_freelancer_payment_status(
    assignments: &[staff_assignment::Model],
) -> FreelancerPaymentStatus {
    if assignments.is_empty() {
        return FreelancerPaymentStatus::Paid;
    }

    let paid_count = assignments
        .iter()
        .filter(|a| a.payment_status == StaffPaymentStatus::Paid.as_str())
        .count();

    if paid_count == 0 {
        FreelancerPaymentStatus::Pending
    } else if paid_count == assignments.len() {
        FreelancerPaymentStatus::Paid
    } else {
        FreelancerPaymentStatus::Partial
    }
}

/// Recomputes the freelancer-payment aggregate for a party and persists it
/// on the party row.
///
/// Returns the freshly computed aggregate. This must run after every
/// mutation of the assignment set (add, remove, pay, unpay) - the cached
/// column is never patched directly anywhere else.
pub async fn refresh_party_freelancer_status(
    db: &DatabaseConnection,
    party_id: i64,
) -> Result<FreelancerPaymentStatus> {
    let party = Party::find_by_id(party_id)
        .one(db)
        .await?
        .ok_or(Error::PartyNotFound { id: party_id })?;

    let assignments = StaffAssignment::find()
        .filter(crate::entities::StaffAssignmentColumn::PartyId.eq(party_id))
        .all(db)
        .await?;

    let aggregate = compute_freelancer_payment_status(&assignments);

    if party.freelancer_payment_status != aggregate.as_str() {
        let mut active: party::ActiveModel = party.into_active_model();
        active.freelancer_payment_status = Set(aggregate.as_str().to_string());
        active.update(db).await?;
        debug!(
            party_id,
            aggregate = aggregate.as_str(),
            "Refreshed cached freelancer-payment status"
        );
    }

    Ok(aggregate)
}

/// Marks a staff assignment paid or unpaid.
///
/// This is a guarded transition, not a blind upsert: if the assignment is
/// already in the requested state nothing happens, so repeated calls can
/// never produce duplicate payment records. Transitioning to paid inserts a
/// payment record (amount = base + bonus, dated today); transitioning back
/// to unpaid deletes it again. Both the status flip and the payment-record
/// side effect commit in one database transaction.
///
/// Callers are expected to refresh the party's freelancer aggregate and
/// re-run the pending->ended check afterwards; the reconciliation
/// orchestrator does both.
pub async fn set_staff_payment_status(
    db: &DatabaseConnection,
    assignment_id: i64,
    paid: bool,
) -> Result<staff_assignment::Model> {
    let txn = db.begin().await?;

    let assignment = StaffAssignment::find_by_id(assignment_id)
        .one(&txn)
        .await?
        .ok_or(Error::AssignmentNotFound { id: assignment_id })?;

    let current = StaffPaymentStatus::parse(&assignment.payment_status)?;
    let requested = if paid {
        StaffPaymentStatus::Paid
    } else {
        StaffPaymentStatus::Pending
    };

    if current == requested {
        debug!(
            assignment_id,
            status = current.as_str(),
            "Assignment already in requested payment state"
        );
        txn.commit().await?;
        return Ok(assignment);
    }

    if paid {
        let record = payment::ActiveModel {
            party_id: Set(assignment.party_id),
            staff_assignment_id: Set(assignment.id),
            amount: Set(assignment.base_amount + assignment.bonus_amount),
            paid_on: Set(Local::now().date_naive().format("%Y-%m-%d").to_string()),
            ..Default::default()
        };
        record.insert(&txn).await?;
    } else {
        Payment::delete_many()
            .filter(PaymentColumn::StaffAssignmentId.eq(assignment.id))
            .exec(&txn)
            .await?;
    }

    let mut active = assignment.into_active_model();
    active.payment_status = Set(requested.as_str().to_string());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    info!(
        assignment_id,
        paid, "Toggled staff assignment payment status"
    );
    Ok(updated)
}
