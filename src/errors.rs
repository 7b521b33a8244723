//! Unified error types for `PartyLedger`.
//!
//! All fallible operations in the crate return [`Result`], so callers (the
//! scheduler tick and any future API layer) can report failures without
//! panicking. Batch reconciliation converts per-party errors into logged
//! skip records rather than aborting the whole pass.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or parsing failed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Underlying database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No party exists with the given ID
    #[error("Party not found: {id}")]
    PartyNotFound {
        /// The party ID that was looked up
        id: i64,
    },

    /// No staff assignment exists with the given ID
    #[error("Staff assignment not found: {id}")]
    AssignmentNotFound {
        /// The assignment ID that was looked up
        id: i64,
    },

    /// No invoice exists with the given ID
    #[error("Invoice not found: {id}")]
    InvoiceNotFound {
        /// The invoice ID that was looked up
        id: i64,
    },

    /// No installment exists with the given ID
    #[error("Installment not found: {id}")]
    InstallmentNotFound {
        /// The installment ID that was looked up
        id: i64,
    },

    /// A monetary amount failed validation (negative total, NaN, ...)
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// A stored date or time string could not be parsed
    #[error("Invalid date/time value: {value}")]
    InvalidDate {
        /// The raw stored value that failed to parse
        value: String,
    },

    /// A party status transition that the state machine does not allow
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the party is currently in
        from: String,
        /// Status the caller attempted to move to
        to: String,
    },

    /// A stored status string did not match any known status
    #[error("Unknown status value: {value}")]
    UnknownStatus {
        /// The raw stored value
        value: String,
    },

    /// Integer conversion failure (e.g. limit casts)
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),
}

/// Convenience `Result` type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
