//! Party business logic - Handles party lifecycle operations.
//!
//! Provides functions for scheduling parties, looking them up, applying the
//! manual status transitions (confirm, mark happening, cancel), and removing
//! them. Hard deletion cascades to every dependent row in one transaction so
//! no assignment, payment, invoice, line item, or installment outlives its
//! party. All functions are async and return Result types for error handling.

use crate::{
    core::status::PartyStatus,
    entities::{
        Installment, InstallmentColumn, Invoice, InvoiceColumn, LineItem, LineItemColumn, Party,
        PartyColumn, Payment, PaymentColumn, StaffAssignment, StaffAssignmentColumn, party,
    },
    errors::{Error, Result},
};
use sea_orm::{IntoActiveModel, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Schedules a new party for a client.
///
/// The date (and start time, when given) must parse, so a party can never be
/// created with schedule data the reconciliation pass would have to skip.
/// New parties start in `planning` with an empty staff set, which counts as
/// fully settled on the freelancer side (nothing owed yet).
pub async fn create_party(
    db: &DatabaseConnection,
    client_name: String,
    event_date: String,
    event_time: Option<String>,
) -> Result<party::Model> {
    if client_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Client name cannot be empty".to_string(),
        });
    }

    // Validates both the date format and the optional time format
    crate::core::status::effective_end(&event_date, event_time.as_deref())?;

    let party = party::ActiveModel {
        client_name: Set(client_name.trim().to_string()),
        event_date: Set(event_date),
        event_time: Set(event_time),
        status: Set(PartyStatus::Planning.as_str().to_string()),
        freelancer_payment_status: Set(
            crate::core::status::FreelancerPaymentStatus::Paid.as_str().to_string()
        ),
        is_deleted: Set(false),
        ..Default::default()
    };

    let result = party.insert(db).await?;
    Ok(result)
}

/// Finds a party by its unique ID.
pub async fn get_party_by_id(db: &DatabaseConnection, party_id: i64) -> Result<Option<party::Model>> {
    Party::find_by_id(party_id).one(db).await.map_err(Into::into)
}

/// Retrieves all active (non-deleted) parties, ordered by event date.
pub async fn get_all_active_parties(db: &DatabaseConnection) -> Result<Vec<party::Model>> {
    Party::find()
        .filter(PartyColumn::IsDeleted.eq(false))
        .order_by_asc(PartyColumn::EventDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all active parties currently in one of the given statuses.
///
/// This is the query the reconciliation pass runs to pick up every party
/// that could still advance (`confirmed` and `ended_pending`).
pub async fn get_parties_with_statuses(
    db: &DatabaseConnection,
    statuses: &[PartyStatus],
) -> Result<Vec<party::Model>> {
    let values: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
    Party::find()
        .filter(PartyColumn::IsDeleted.eq(false))
        .filter(PartyColumn::Status.is_in(values))
        .order_by_asc(PartyColumn::EventDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Confirms a party that is still in `planning`.
pub async fn confirm_party(db: &DatabaseConnection, party_id: i64) -> Result<party::Model> {
    transition(db, party_id, PartyStatus::Confirmed).await
}

/// Manually flags a `confirmed` party as currently in progress.
pub async fn mark_happening(db: &DatabaseConnection, party_id: i64) -> Result<party::Model> {
    transition(db, party_id, PartyStatus::Happening).await
}

/// Cancels a party from any non-terminal state.
pub async fn cancel_party(db: &DatabaseConnection, party_id: i64) -> Result<party::Model> {
    transition(db, party_id, PartyStatus::Cancelled).await
}

/// Applies a manual status transition after checking it against the state machine.
async fn transition(
    db: &DatabaseConnection,
    party_id: i64,
    to: PartyStatus,
) -> Result<party::Model> {
    let party = get_party_by_id(db, party_id)
        .await?
        .ok_or(Error::PartyNotFound { id: party_id })?;

    let from = PartyStatus::parse(&party.status)?;
    if !from.can_transition_to(to) {
        return Err(Error::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        });
    }

    let mut active = party.into_active_model();
    active.status = Set(to.as_str().to_string());
    let updated = active.update(db).await?;
    info!(
        party_id,
        from = from.as_str(),
        to = to.as_str(),
        "Applied manual party status transition"
    );
    Ok(updated)
}

/// Soft-deletes a party, hiding it from listings while preserving its
/// billing history.
pub async fn soft_delete_party(db: &DatabaseConnection, party_id: i64) -> Result<party::Model> {
    let party = get_party_by_id(db, party_id)
        .await?
        .ok_or(Error::PartyNotFound { id: party_id })?;

    let mut active = party.into_active_model();
    active.is_deleted = Set(true);
    active.update(db).await.map_err(Into::into)
}

/// Hard-deletes a party and everything that hangs off it.
///
/// Installments, line items, the invoice, payment records, and staff
/// assignments are removed in the same database transaction as the party
/// row, so a partial failure leaves everything in place.
#[instrument(skip(db))]
pub async fn delete_party(db: &DatabaseConnection, party_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let party = Party::find_by_id(party_id)
        .one(&txn)
        .await?
        .ok_or(Error::PartyNotFound { id: party_id })?;

    // Line items hang off the invoice, not the party, so resolve those first
    let invoices = Invoice::find()
        .filter(InvoiceColumn::PartyId.eq(party_id))
        .all(&txn)
        .await?;
    for invoice in &invoices {
        LineItem::delete_many()
            .filter(LineItemColumn::InvoiceId.eq(invoice.id))
            .exec(&txn)
            .await?;
    }

    Installment::delete_many()
        .filter(InstallmentColumn::PartyId.eq(party_id))
        .exec(&txn)
        .await?;
    Invoice::delete_many()
        .filter(InvoiceColumn::PartyId.eq(party_id))
        .exec(&txn)
        .await?;
    Payment::delete_many()
        .filter(PaymentColumn::PartyId.eq(party_id))
        .exec(&txn)
        .await?;
    StaffAssignment::delete_many()
        .filter(StaffAssignmentColumn::PartyId.eq(party_id))
        .exec(&txn)
        .await?;

    party.delete(&txn).await?;

    txn.commit().await?;
    info!(party_id, "Deleted party and all dependent records");
    Ok(())
}
