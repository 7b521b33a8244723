//! Database configuration module for `PartyLedger`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Installment, Invoice, LineItem, Party, Payment, StaffAssignment};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/party_ledger.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct definitions.
/// It creates tables for parties, staff assignments, payments, invoices, line items, and
/// installments.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    // Use SeaORM's proper table creation using Schema::create_table_from_entity
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Create tables using SeaORM's schema generation
    let party_table = schema.create_table_from_entity(Party);
    let staff_assignment_table = schema.create_table_from_entity(StaffAssignment);
    let payment_table = schema.create_table_from_entity(Payment);
    let invoice_table = schema.create_table_from_entity(Invoice);
    let line_item_table = schema.create_table_from_entity(LineItem);
    let installment_table = schema.create_table_from_entity(Installment);

    db.execute(builder.build(&party_table)).await?;
    db.execute(builder.build(&staff_assignment_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&invoice_table)).await?;
    db.execute(builder.build(&line_item_table)).await?;
    db.execute(builder.build(&installment_table)).await?;

    Ok(())
}
