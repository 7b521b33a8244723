//! Staff assignment business logic.
//!
//! Provides functions for adding freelancers to a party, editing the agreed
//! amounts, confirming attendance, and removing assignments. The agreed
//! total for an assignment is base plus bonus; the base rate and standing
//! fixed bonus are resolved from the external staff profile by the caller
//! at assignment time. Every mutation of the assignment set ends with a
//! refresh of the owning party's freelancer-payment aggregate.

use crate::{
    core::status::StaffPaymentStatus,
    entities::{
        Party, Payment, PaymentColumn, StaffAssignment, StaffAssignmentColumn, staff_assignment,
    },
    errors::{Error, Result},
};
use sea_orm::{IntoActiveModel, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Adds a freelancer to a party.
///
/// `base_amount` and `bonus_amount` are the agreed figures at assignment
/// time (the caller resolves the freelancer's standing rate and fixed bonus
/// from the external profile store). The combined total may not be negative.
pub async fn add_assignment(
    db: &DatabaseConnection,
    party_id: i64,
    staff_name: String,
    base_amount: f64,
    bonus_amount: f64,
    bonus_reason: Option<String>,
) -> Result<staff_assignment::Model> {
    if staff_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Staff name cannot be empty".to_string(),
        });
    }
    validate_amounts(base_amount, bonus_amount)?;

    Party::find_by_id(party_id)
        .one(db)
        .await?
        .ok_or(Error::PartyNotFound { id: party_id })?;

    let assignment = staff_assignment::ActiveModel {
        party_id: Set(party_id),
        staff_name: Set(staff_name.trim().to_string()),
        base_amount: Set(base_amount),
        bonus_amount: Set(bonus_amount),
        bonus_reason: Set(bonus_reason),
        payment_status: Set(StaffPaymentStatus::Pending.as_str().to_string()),
        confirmation_status: Set("pending".to_string()),
        ..Default::default()
    };

    let result = assignment.insert(db).await?;

    // A new unpaid assignment changes the party's aggregate
    crate::core::payment::refresh_party_freelancer_status(db, party_id).await?;
    Ok(result)
}

/// Finds an assignment by its unique ID.
pub async fn get_assignment_by_id(
    db: &DatabaseConnection,
    assignment_id: i64,
) -> Result<Option<staff_assignment::Model>> {
    StaffAssignment::find_by_id(assignment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all assignments for a party, ordered by staff name.
pub async fn get_assignments_for_party(
    db: &DatabaseConnection,
    party_id: i64,
) -> Result<Vec<staff_assignment::Model>> {
    StaffAssignment::find()
        .filter(StaffAssignmentColumn::PartyId.eq(party_id))
        .order_by_asc(StaffAssignmentColumn::StaffName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates the agreed amounts on an assignment.
///
/// The payment record of an already-paid assignment is not touched: it
/// captures the amount that actually moved when the payment was made.
pub async fn update_assignment_amounts(
    db: &DatabaseConnection,
    assignment_id: i64,
    base_amount: f64,
    bonus_amount: f64,
    bonus_reason: Option<String>,
) -> Result<staff_assignment::Model> {
    validate_amounts(base_amount, bonus_amount)?;

    let assignment = get_assignment_by_id(db, assignment_id)
        .await?
        .ok_or(Error::AssignmentNotFound { id: assignment_id })?;

    let mut active = assignment.into_active_model();
    active.base_amount = Set(base_amount);
    active.bonus_amount = Set(bonus_amount);
    active.bonus_reason = Set(bonus_reason);
    active.update(db).await.map_err(Into::into)
}

/// Marks an assignment as confirmed by the freelancer.
pub async fn confirm_assignment(
    db: &DatabaseConnection,
    assignment_id: i64,
) -> Result<staff_assignment::Model> {
    let assignment = get_assignment_by_id(db, assignment_id)
        .await?
        .ok_or(Error::AssignmentNotFound { id: assignment_id })?;

    let mut active = assignment.into_active_model();
    active.confirmation_status = Set("confirmed".to_string());
    active.update(db).await.map_err(Into::into)
}

/// Removes a freelancer from a party.
///
/// Any payment record tied to the assignment is deleted in the same
/// transaction, then the party's aggregate is refreshed.
#[instrument(skip(db))]
pub async fn remove_assignment(db: &DatabaseConnection, assignment_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let assignment = StaffAssignment::find_by_id(assignment_id)
        .one(&txn)
        .await?
        .ok_or(Error::AssignmentNotFound { id: assignment_id })?;
    let party_id = assignment.party_id;

    Payment::delete_many()
        .filter(PaymentColumn::StaffAssignmentId.eq(assignment_id))
        .exec(&txn)
        .await?;
    assignment.delete(&txn).await?;

    txn.commit().await?;

    crate::core::payment::refresh_party_freelancer_status(db, party_id).await?;
    info!(assignment_id, party_id, "Removed staff assignment");
    Ok(())
}

/// Rejects amount pairs whose total is negative or not finite.
fn validate_amounts(base_amount: f64, bonus_amount: f64) -> Result<()> {
    let total = base_amount + bonus_amount;
    if !total.is_finite() || total < 0.0 {
        return Err(Error::InvalidAmount { amount: total });
    }
    Ok(())
}
