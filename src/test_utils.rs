//! Shared test utilities for `PartyLedger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{invoice, party, staff},
    entities,
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test party with the given schedule.
///
/// New parties start in `planning` with an empty staff set.
pub async fn create_test_party(
    db: &DatabaseConnection,
    client_name: &str,
    event_date: &str,
    event_time: Option<&str>,
) -> Result<entities::party::Model> {
    party::create_party(
        db,
        client_name.to_string(),
        event_date.to_string(),
        event_time.map(ToString::to_string),
    )
    .await
}

/// Moves a freshly created test party into `confirmed` through the normal
/// transition path.
pub async fn confirm_test_party(
    db: &DatabaseConnection,
    party_model: entities::party::Model,
) -> Result<entities::party::Model> {
    party::confirm_party(db, party_model.id).await
}

/// Forces a party into an arbitrary stored status, bypassing the state
/// machine. Only for arranging test fixtures.
pub async fn set_party_status(
    db: &DatabaseConnection,
    party_model: entities::party::Model,
    status: &str,
) -> Result<entities::party::Model> {
    let mut active = party_model.into_active_model();
    active.status = Set(status.to_string());
    active.update(db).await.map_err(Into::into)
}

/// Creates a test staff assignment with the given amounts.
///
/// # Defaults
/// * `bonus_reason`: None
/// * payment and confirmation status: pending
pub async fn create_test_assignment(
    db: &DatabaseConnection,
    party_id: i64,
    staff_name: &str,
    base_amount: f64,
    bonus_amount: f64,
) -> Result<entities::staff_assignment::Model> {
    staff::add_assignment(
        db,
        party_id,
        staff_name.to_string(),
        base_amount,
        bonus_amount,
        None,
    )
    .await
}

/// Creates a test invoice with no discount or surcharge.
///
/// Returns the full creation result so tests can inspect the generated
/// installment plan and any non-fatal generation warning.
pub async fn create_test_invoice(
    db: &DatabaseConnection,
    party_id: i64,
    items: Vec<invoice::LineItemInput>,
    payment_mode: crate::core::status::PaymentMode,
    installment_count: i32,
    down_payment: f64,
) -> Result<invoice::InvoiceCreation> {
    invoice::create_invoice(
        db,
        party_id,
        items,
        0.0,
        0.0,
        payment_mode,
        installment_count,
        down_payment,
    )
    .await
}
